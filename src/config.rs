//! Configuration model for portcheck.
//!
//! Holds the default backend and named host aliases, stored as TOML.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::backend::BackendSpec;
use crate::error::{ConfigError, Result};

/// The main configuration, stored as TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Backend used when no `--host` is given.
    #[serde(default)]
    pub default_backend: BackendSpec,

    /// Named hosts (e.g., "web" -> "ssh://deploy@web1").
    #[serde(default)]
    pub hosts: BTreeMap<String, BackendSpec>,
}

impl Config {
    /// Resolves the backend for a `--host` argument.
    ///
    /// An alias takes precedence over parsing the value as a backend spec.
    /// Without an argument the default backend is used.
    pub fn resolve_backend(&self, host: Option<&str>) -> Result<BackendSpec> {
        let Some(host) = host else {
            return Ok(self.default_backend.clone());
        };

        if let Some(spec) = self.hosts.get(host) {
            return Ok(spec.clone());
        }

        Ok(host.parse::<BackendSpec>()?)
    }

    /// Adds or replaces a host alias from a `NAME=SPEC` assignment.
    ///
    /// Returns the alias name and its parsed spec.
    pub fn add_host(&mut self, assignment: &str) -> Result<(String, BackendSpec)> {
        let (name, spec) = assignment
            .split_once('=')
            .filter(|(name, _)| !name.trim().is_empty())
            .ok_or_else(|| ConfigError::InvalidAssignment(assignment.to_string()))?;

        let name = name.trim().to_string();
        let spec: BackendSpec = spec.trim().parse()?;
        self.hosts.insert(name.clone(), spec.clone());
        Ok((name, spec))
    }

    /// Removes a host alias, returning its spec.
    pub fn remove_host(&mut self, name: &str) -> Result<BackendSpec> {
        self.hosts
            .remove(name)
            .ok_or_else(|| ConfigError::HostNotFound(name.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BackendError, Error};

    fn web_spec() -> BackendSpec {
        BackendSpec::Ssh {
            user: Some("deploy".to_string()),
            host: "web1".to_string(),
            port: None,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_backend, BackendSpec::Local);
        assert!(config.hosts.is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
default_backend = "docker://app"

[hosts]
web = "ssh://deploy@web1"
"#,
        )
        .unwrap();
        assert_eq!(
            config.default_backend,
            BackendSpec::Docker {
                container: "app".to_string()
            }
        );
        assert_eq!(config.hosts.get("web"), Some(&web_spec()));
    }

    #[test]
    fn test_parse_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_resolve_backend() {
        let mut config = Config::default();
        config.hosts.insert("web".to_string(), web_spec());

        assert_eq!(config.resolve_backend(None).unwrap(), BackendSpec::Local);
        assert_eq!(config.resolve_backend(Some("web")).unwrap(), web_spec());
        assert_eq!(
            config.resolve_backend(Some("docker://db")).unwrap(),
            BackendSpec::Docker {
                container: "db".to_string()
            }
        );
        assert!(matches!(
            config.resolve_backend(Some("db")),
            Err(Error::Backend(BackendError::InvalidSpec(_)))
        ));
    }

    #[test]
    fn test_resolve_backend_uses_configured_default() {
        let config = Config {
            default_backend: web_spec(),
            ..Config::default()
        };

        assert_eq!(config.resolve_backend(None).unwrap(), web_spec());
        assert_eq!(config.resolve_backend(Some("local")).unwrap(), BackendSpec::Local);
    }

    #[test]
    fn test_add_and_remove_host() {
        let mut config = Config::default();
        let (name, spec) = config.add_host("web=ssh://deploy@web1").unwrap();
        assert_eq!(name, "web");
        assert_eq!(spec, web_spec());

        assert_eq!(config.remove_host("web").unwrap(), web_spec());
        assert!(matches!(
            config.remove_host("web"),
            Err(Error::Config(ConfigError::HostNotFound(_)))
        ));
    }

    #[test]
    fn test_add_host_invalid_assignment() {
        let mut config = Config::default();
        assert!(matches!(
            config.add_host("no-equals"),
            Err(Error::Config(ConfigError::InvalidAssignment(_)))
        ));
        assert!(matches!(
            config.add_host("=local"),
            Err(Error::Config(ConfigError::InvalidAssignment(_)))
        ));
        assert!(config.add_host("web=bogus").is_err());
    }
}
