//! CLI command definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};

/// portcheck - assert that an address:port is listening on a host.
#[derive(Parser, Debug)]
#[command(name = "portcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Host alias from the config, or a backend spec
    /// (local, ssh://[user@]host[:port], docker://container)
    #[arg(long, short = 'H', global = true)]
    pub host: Option<String>,

    /// OS family of the host (e.g. "linux", "freebsd"); detected with `uname -s` if omitted
    #[arg(long, global = true)]
    pub os: Option<String>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Transport protocol expected by `check --proto`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check whether an address:port is listening.
    ///
    /// Exits with a non-zero status unless the port is listening.
    #[command(visible_alias = "c")]
    Check {
        /// Local address to look for (use 0.0.0.0 for the wildcard address)
        address: String,

        /// Port number
        port: u16,

        /// Also require the connection to use this protocol
        #[arg(long, value_enum)]
        proto: Option<Protocol>,

        /// Report the connection without failing when it is not listening
        #[arg(long)]
        no_assert: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List the connections reported by netstat.
    #[command(visible_alias = "l", visible_alias = "ls")]
    List {
        /// Only show listening connections
        #[arg(long)]
        listening: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Print the netstat command used for the host.
    #[command(name = "command", visible_alias = "cmd")]
    ShowCommand,

    /// Show or edit configuration.
    #[command(visible_alias = "cfg")]
    Config {
        /// Show the config file path
        #[arg(long)]
        path: bool,

        /// Set the default backend (e.g., "local", "ssh://deploy@web1")
        #[arg(long, value_name = "SPEC", conflicts_with_all = ["add_host", "remove_host"])]
        set_backend: Option<String>,

        /// Add a host alias (format: name=spec, e.g., "web=ssh://deploy@web1")
        #[arg(long, value_name = "NAME=SPEC", conflicts_with = "remove_host")]
        add_host: Option<String>,

        /// Remove a host alias
        #[arg(long, value_name = "NAME")]
        remove_host: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_with_globals() {
        let cli = Cli::try_parse_from([
            "portcheck",
            "-vv",
            "check",
            "0.0.0.0",
            "22",
            "--proto",
            "tcp",
            "--os",
            "linux",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.os.as_deref(), Some("linux"));
        match cli.command {
            Command::Check {
                address,
                port,
                proto,
                ..
            } => {
                assert_eq!(address, "0.0.0.0");
                assert_eq!(port, 22);
                assert_eq!(proto, Some(Protocol::Tcp));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_port_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["portcheck", "check", "0.0.0.0", "70000"]).is_err());
    }

    #[test]
    fn test_command_subcommand_name() {
        let cli = Cli::try_parse_from(["portcheck", "command"]).unwrap();
        assert!(matches!(cli.command, Command::ShowCommand));

        let cli = Cli::try_parse_from(["portcheck", "cmd"]).unwrap();
        assert!(matches!(cli.command, Command::ShowCommand));
    }

    #[test]
    fn test_config_edits_are_exclusive() {
        for args in [
            ["--set-backend", "local", "--add-host", "web=local"],
            ["--set-backend", "local", "--remove-host", "web"],
            ["--add-host", "web=local", "--remove-host", "db"],
        ] {
            let err = Cli::try_parse_from(["portcheck", "config"].into_iter().chain(args))
                .unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict, "{args:?}");
        }
    }
}
