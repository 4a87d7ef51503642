//! portcheck CLI - assert that an address:port is listening on a host.

mod backend;
mod cli;
mod config;
mod connection;
mod display;
mod error;
mod logger;
mod netstat;
mod persistence;
mod sysinfo;

use clap::Parser;

use backend::{Backend, BackendSpec, CommandBackend};
use cli::{Cli, Command, Protocol};
use connection::{ConnectionRecord, PortLookup};
use display::{
    display_config, display_config_json, display_connection, display_connection_json,
    display_rows, display_rows_json,
};
use error::{AssertionError, Result};
use logger::setup_logger;
use persistence::{config_path, load_config, with_config_mut};
use sysinfo::SystemInfo;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logger(cli.verbose);

    let target = Target {
        host: cli.host,
        os: cli.os,
    };

    match cli.command {
        Command::Check {
            address,
            port,
            proto,
            no_assert,
            json,
        } => cmd_check(&target, &address, port, proto, no_assert, json),

        Command::List { listening, json } => cmd_list(&target, listening, json),

        Command::ShowCommand => cmd_command(&target),

        Command::Config {
            path,
            set_backend,
            add_host,
            remove_host,
            json,
        } => cmd_config(path, set_backend, add_host, remove_host, json),
    }
}

/// The host selected by the global `--host`/`--os` flags.
struct Target {
    host: Option<String>,
    os: Option<String>,
}

impl Target {
    fn backend(&self) -> Result<CommandBackend> {
        let config = load_config()?;
        let spec = config.resolve_backend(self.host.as_deref())?;
        Ok(CommandBackend::new(spec))
    }

    fn system_info(&self, backend: &dyn Backend) -> Result<SystemInfo> {
        match &self.os {
            Some(os) => Ok(SystemInfo::new(os)),
            None => Ok(SystemInfo::detect(backend)?),
        }
    }
}

fn cmd_check(
    target: &Target,
    address: &str,
    port: u16,
    proto: Option<Protocol>,
    no_assert: bool,
    json: bool,
) -> Result<()> {
    let backend = target.backend()?;
    let system = target.system_info(&backend)?;
    let record = PortLookup::new(&backend, &system)?.lookup(address, port)?;

    if json {
        display_connection_json(&record);
    } else {
        display_connection(&record);
    }

    if no_assert {
        return Ok(());
    }
    assert_connection(&record, proto)?;
    Ok(())
}

/// Fails unless `record` is listening, over `proto` when given.
fn assert_connection(
    record: &ConnectionRecord,
    proto: Option<Protocol>,
) -> std::result::Result<(), AssertionError> {
    if !record.is_listening() {
        return Err(AssertionError::NotListening {
            address: record.address.clone(),
            port: record.port,
        });
    }

    let matches = match proto {
        Some(Protocol::Tcp) => record.is_tcp(),
        Some(Protocol::Udp) => record.is_udp(),
        None => true,
    };
    if let (false, Some(expected)) = (matches, proto) {
        return Err(AssertionError::ProtocolMismatch {
            address: record.address.clone(),
            port: record.port,
            expected: expected.as_str().to_string(),
            actual: record.protocol.clone().unwrap_or_default(),
        });
    }

    Ok(())
}

fn cmd_list(target: &Target, listening_only: bool, json: bool) -> Result<()> {
    let backend = target.backend()?;
    let system = target.system_info(&backend)?;
    let mut rows = PortLookup::new(&backend, &system)?.list()?;

    if listening_only {
        rows.retain(|row| row.is_listening());
    }

    if json {
        display_rows_json(&rows);
    } else {
        display_rows(&rows);
    }
    Ok(())
}

fn cmd_command(target: &Target) -> Result<()> {
    let backend = target.backend()?;
    let system = target.system_info(&backend)?;
    let lookup = PortLookup::new(&backend, &system)?;
    println!("{}", lookup.flavor().command());
    Ok(())
}

fn cmd_config(
    show_path: bool,
    set_backend: Option<String>,
    add_host: Option<String>,
    remove_host: Option<String>,
    json: bool,
) -> Result<()> {
    if let Some(spec) = set_backend {
        let spec: BackendSpec = spec.parse()?;
        let shown = spec.to_string();
        with_config_mut(|config| {
            config.default_backend = spec;
            Ok(())
        })?;
        println!("Set default backend to {shown}");
        return Ok(());
    }

    if let Some(assignment) = add_host {
        let (name, spec) = with_config_mut(|config| config.add_host(&assignment))?;
        println!("Added host {name} = {spec}");
        return Ok(());
    }

    if let Some(name) = remove_host {
        let spec = with_config_mut(|config| config.remove_host(&name))?;
        println!("Removed host {name} (was {spec})");
        return Ok(());
    }

    let config = load_config()?;
    let path = config_path()?;
    let path = show_path.then_some(path.as_path());

    if json {
        display_config_json(&config, path);
    } else {
        display_config(&config, path);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(protocol: Option<&str>, state: Option<&str>) -> ConnectionRecord {
        ConnectionRecord {
            address: "0.0.0.0".to_string(),
            port: 22,
            protocol: protocol.map(str::to_string),
            state: state.map(str::to_string),
        }
    }

    #[test]
    fn test_assert_listening() {
        assert!(assert_connection(&record(Some("tcp"), Some("LISTEN")), None).is_ok());
        let tcp6 = record(Some("tcp6"), Some("LISTEN"));
        assert!(assert_connection(&tcp6, Some(Protocol::Tcp)).is_ok());
    }

    #[test]
    fn test_assert_not_listening() {
        assert_eq!(
            assert_connection(&record(None, None), None),
            Err(AssertionError::NotListening {
                address: "0.0.0.0".to_string(),
                port: 22,
            })
        );
        assert!(assert_connection(&record(Some("tcp"), Some("ESTABLISHED")), None).is_err());
    }

    #[test]
    fn test_assert_protocol_mismatch() {
        assert_eq!(
            assert_connection(&record(Some("tcp"), Some("LISTEN")), Some(Protocol::Udp)),
            Err(AssertionError::ProtocolMismatch {
                address: "0.0.0.0".to_string(),
                port: 22,
                expected: "udp".to_string(),
                actual: "tcp".to_string(),
            })
        );
    }
}
