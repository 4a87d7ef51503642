//! Diagnostic logging to stderr.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Environment variable overriding the log filter.
const LOG_ENV: &str = "PORTCHECK_LOG";

/// Maps the `-v` count to a default filter directive.
fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "portcheck=warn",
        1 => "portcheck=debug",
        _ => "portcheck=trace",
    }
}

/// Installs the global subscriber. Stdout stays reserved for command output.
pub fn setup_logger(verbosity: u8) {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: logger already initialized");
    }
}
