//! Error types for the portcheck CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for portcheck operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("{0}")]
    Assertion(#[from] AssertionError),
}

/// Errors related to configuration file operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file at {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to lock config file at {path}: {source}")]
    LockFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),

    #[error("Host alias '{0}' not found")]
    HostNotFound(String),

    #[error("Invalid host assignment '{0}' (expected NAME=SPEC)")]
    InvalidAssignment(String),
}

/// Errors raised by command execution backends.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to run '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with status {status}: {stderr}")]
    UnexpectedExit {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("Invalid backend spec '{0}' (expected local, ssh://[user@]host[:port] or docker://container)")]
    InvalidSpec(String),
}

/// Errors related to connection lookups.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LookupError {
    #[error("Platform '{0}' is not supported")]
    UnsupportedPlatform(String),
}

/// Failed `check` assertions.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AssertionError {
    #[error("{address}:{port} is not listening")]
    NotListening { address: String, port: u16 },

    #[error("{address}:{port} is listening over {actual}, expected {expected}")]
    ProtocolMismatch {
        address: String,
        port: u16,
        expected: String,
        actual: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_platform_message() {
        let err: Error = LookupError::UnsupportedPlatform("sunos".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Lookup error: Platform 'sunos' is not supported"
        );
    }

    #[test]
    fn test_assertion_message_is_bare() {
        let err: Error = AssertionError::NotListening {
            address: "0.0.0.0".to_string(),
            port: 22,
        }
        .into();
        assert_eq!(err.to_string(), "0.0.0.0:22 is not listening");
    }
}
