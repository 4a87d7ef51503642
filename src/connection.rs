//! Connection lookup against a host's `netstat` table.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::backend::Backend;
use crate::error::Result;
use crate::netstat::{parse_rows, Flavor, NetstatRow};
use crate::sysinfo::SystemInfo;

/// Exit statuses accepted from the listing command.
const ACCEPTED_STATUSES: &[i32] = &[0, 1];

/// The result of looking up one `address:port` pair.
///
/// `protocol` and `state` stay `None` when no row matched, in which case
/// `address` and `port` are still the queried values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionRecord {
    pub address: String,
    pub port: u16,
    pub protocol: Option<String>,
    pub state: Option<String>,
}

impl ConnectionRecord {
    fn not_found(address: &str, port: u16) -> Self {
        Self {
            address: address.to_string(),
            port,
            protocol: None,
            state: None,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.state.as_deref() == Some("LISTEN")
    }

    pub fn is_tcp(&self) -> bool {
        self.protocol
            .as_deref()
            .is_some_and(|p| p.starts_with("tcp"))
    }

    pub fn is_udp(&self) -> bool {
        self.protocol
            .as_deref()
            .is_some_and(|p| p.starts_with("udp"))
    }
}

impl fmt::Display for ConnectionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

impl From<NetstatRow> for ConnectionRecord {
    fn from(row: NetstatRow) -> Self {
        Self {
            address: row.address,
            port: row.port,
            protocol: Some(row.protocol),
            state: Some(row.state),
        }
    }
}

/// Finds the first row of `output` whose local endpoint is `address:port`.
pub fn find_connection(output: &str, flavor: Flavor, address: &str, port: u16) -> ConnectionRecord {
    parse_rows(output, flavor)
        .find(|row| row.address == address && row.port == port)
        .map(ConnectionRecord::from)
        .unwrap_or_else(|| ConnectionRecord::not_found(address, port))
}

/// Looks up connections on one host.
///
/// The netstat flavor is fixed at construction from the host's OS family.
pub struct PortLookup<'a> {
    backend: &'a dyn Backend,
    flavor: Flavor,
}

impl<'a> PortLookup<'a> {
    /// Creates a lookup for the host behind `backend`.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::UnsupportedPlatform` if the OS family has no
    /// known netstat flavor.
    pub fn new(backend: &'a dyn Backend, system: &SystemInfo) -> Result<Self> {
        let flavor = Flavor::for_os_type(&system.os_type)?;
        Ok(Self { backend, flavor })
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    fn netstat_output(&self) -> Result<String> {
        let output = self
            .backend
            .run_expect(ACCEPTED_STATUSES, self.flavor.command())?;
        Ok(output.stdout)
    }

    /// Looks up `address:port`. A missing connection is not an error.
    pub fn lookup(&self, address: &str, port: u16) -> Result<ConnectionRecord> {
        let output = self.netstat_output()?;
        let record = find_connection(&output, self.flavor, address, port);
        debug!(
            target_endpoint = %record,
            protocol = ?record.protocol,
            state = ?record.state,
            "lookup finished"
        );
        Ok(record)
    }

    /// Returns every well-formed row of the connection table.
    pub fn list(&self) -> Result<Vec<NetstatRow>> {
        let output = self.netstat_output()?;
        Ok(parse_rows(&output, self.flavor).collect())
    }
}
