//! Parsing of `netstat` connection tables.
//!
//! Two output flavors are supported, picked from the OS family of the
//! inspected host. Both share the same six-column row layout:
//!
//! ```text
//! Proto Recv-Q Send-Q Local Address     Foreign Address   (state)
//! tcp        0      0 0.0.0.0:22        0.0.0.0:*         LISTEN
//! tcp4       0      0 *.22              *.*               LISTEN
//! ```

mod bsd;
mod gnu;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::LookupError;

/// Number of whitespace-separated columns in a connection row.
const ROW_FIELDS: usize = 6;

/// The `netstat` output dialect of a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// GNU net-tools on Linux.
    Gnu,
    /// BSD-derived systems, including macOS.
    Bsd,
}

impl Flavor {
    /// Selects the flavor for an OS family such as "linux" or "freebsd".
    pub fn for_os_type(os_type: &str) -> Result<Self, LookupError> {
        let os_type = os_type.trim().to_lowercase();
        let flavor = if os_type == "linux" {
            Flavor::Gnu
        } else if os_type.ends_with("bsd") || os_type == "darwin" {
            Flavor::Bsd
        } else {
            return Err(LookupError::UnsupportedPlatform(os_type));
        };
        debug!(os_type = %os_type, ?flavor, "selected netstat flavor");
        Ok(flavor)
    }

    /// The command line listing active connections.
    pub fn command(self) -> &'static str {
        match self {
            Flavor::Gnu => gnu::COMMAND,
            Flavor::Bsd => bsd::COMMAND,
        }
    }

    /// Decomposes a local address token into a normalized address and port.
    pub fn split_local_address(self, token: &str) -> Option<(String, u16)> {
        match self {
            Flavor::Gnu => gnu::split_local_address(token),
            Flavor::Bsd => bsd::split_local_address(token),
        }
    }
}

/// One connection row of a `netstat` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetstatRow {
    pub protocol: String,
    pub address: String,
    pub port: u16,
    pub state: String,
}

impl NetstatRow {
    pub fn is_listening(&self) -> bool {
        self.state == "LISTEN"
    }
}

/// Splits a line into its six columns, or `None` for anything shaped
/// differently (headers, summaries, and rows without a state column).
fn split_row(line: &str) -> Option<[&str; ROW_FIELDS]> {
    let mut fields = line.split_whitespace();
    let row = [
        fields.next()?,
        fields.next()?,
        fields.next()?,
        fields.next()?,
        fields.next()?,
        fields.next()?,
    ];
    if fields.next().is_some() {
        return None;
    }
    Some(row)
}

/// Yields every well-formed row of `output`, in table order.
pub fn parse_rows(output: &str, flavor: Flavor) -> impl Iterator<Item = NetstatRow> + '_ {
    output.lines().filter_map(move |line| {
        let Some([protocol, _recv_q, _send_q, local_address, _foreign_address, state]) =
            split_row(line)
        else {
            trace!(line, "skipping line with unexpected shape");
            return None;
        };

        let Some((address, port)) = flavor.split_local_address(local_address) else {
            trace!(local_address, "skipping row with unparseable local address");
            return None;
        };

        Some(NetstatRow {
            protocol: protocol.to_string(),
            address,
            port,
            state: state.to_string(),
        })
    })
}
