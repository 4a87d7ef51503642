//! Command execution backends.
//!
//! A backend runs a shell command on the inspected host and hands back its
//! output. The host is reached either directly, over `ssh`, or inside a
//! running docker container.

use std::fmt;
use std::process::Command;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::BackendError;

/// Captured output of a command run through a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status, or -1 when the process was killed by a signal.
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Stdout with surrounding newlines and whitespace removed.
    pub fn trimmed_stdout(&self) -> &str {
        self.stdout.trim()
    }
}

/// Something that can run a shell command on the inspected host.
pub trait Backend {
    /// Runs `command` and returns its output whatever the exit status.
    fn run(&self, command: &str) -> Result<CommandOutput, BackendError>;

    /// Runs `command`, failing unless the exit status is one of `expected`.
    fn run_expect(&self, expected: &[i32], command: &str) -> Result<CommandOutput, BackendError> {
        let output = self.run(command)?;
        if !expected.contains(&output.exit_status) {
            return Err(BackendError::UnexpectedExit {
                command: command.to_string(),
                status: output.exit_status,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

/// Where commands are executed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BackendSpec {
    /// This machine, through `sh -c`.
    #[default]
    Local,
    /// A remote machine reached with the `ssh` client.
    Ssh {
        user: Option<String>,
        host: String,
        port: Option<u16>,
    },
    /// A running container reached with `docker exec`.
    Docker { container: String },
}

impl BackendSpec {
    /// Builds the process invocation that runs `command` for this spec.
    fn to_command(&self, command: &str) -> Command {
        match self {
            BackendSpec::Local => {
                let mut cmd = Command::new("sh");
                cmd.arg("-c").arg(command);
                cmd
            }
            BackendSpec::Ssh { user, host, port } => {
                let mut cmd = Command::new("ssh");
                if let Some(port) = port {
                    cmd.arg("-p").arg(port.to_string());
                }
                match user {
                    Some(user) => cmd.arg(format!("{user}@{host}")),
                    None => cmd.arg(host),
                };
                cmd.arg(command);
                cmd
            }
            BackendSpec::Docker { container } => {
                let mut cmd = Command::new("docker");
                cmd.args(["exec", container.as_str(), "sh", "-c", command]);
                cmd
            }
        }
    }
}

impl fmt::Display for BackendSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendSpec::Local => write!(f, "local"),
            BackendSpec::Ssh { user, host, port } => {
                write!(f, "ssh://")?;
                if let Some(user) = user {
                    write!(f, "{user}@")?;
                }
                write!(f, "{host}")?;
                if let Some(port) = port {
                    write!(f, ":{port}")?;
                }
                Ok(())
            }
            BackendSpec::Docker { container } => write!(f, "docker://{container}"),
        }
    }
}

impl FromStr for BackendSpec {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BackendError::InvalidSpec(s.to_string());

        if s == "local" || s == "local://" {
            return Ok(BackendSpec::Local);
        }

        if let Some(rest) = s.strip_prefix("ssh://") {
            let (user, host_port) = match rest.split_once('@') {
                Some((user, host_port)) if !user.is_empty() => (Some(user.to_string()), host_port),
                Some(_) => return Err(invalid()),
                None => (None, rest),
            };
            let (host, port) = match host_port.rsplit_once(':') {
                Some((host, port)) => (host, Some(port.parse::<u16>().map_err(|_| invalid())?)),
                None => (host_port, None),
            };
            if host.is_empty() {
                return Err(invalid());
            }
            return Ok(BackendSpec::Ssh {
                user,
                host: host.to_string(),
                port,
            });
        }

        if let Some(container) = s.strip_prefix("docker://") {
            if container.is_empty() {
                return Err(invalid());
            }
            return Ok(BackendSpec::Docker {
                container: container.to_string(),
            });
        }

        Err(invalid())
    }
}

impl Serialize for BackendSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BackendSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Backend that spawns processes according to a [`BackendSpec`].
#[derive(Debug, Clone)]
pub struct CommandBackend {
    spec: BackendSpec,
}

impl CommandBackend {
    pub fn new(spec: BackendSpec) -> Self {
        Self { spec }
    }
}

impl Backend for CommandBackend {
    fn run(&self, command: &str) -> Result<CommandOutput, BackendError> {
        debug!(backend = %self.spec, command, "running command");

        let mut process = self.spec.to_command(command);
        let output = process.output().map_err(|source| BackendError::SpawnFailed {
            command: command.to_string(),
            source,
        })?;

        let result = CommandOutput {
            exit_status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(status = result.exit_status, "command finished");

        Ok(result)
    }
}
