//! Persistence layer for portcheck.
//!
//! Handles loading and saving the TOML config file.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::config::Config;
use crate::error::{ConfigError, Result};

/// Returns the path to the config file.
///
/// Respects the `PORTCHECK_CONFIG_PATH` environment variable if set,
/// otherwise uses the system config directory.
pub fn config_path() -> std::result::Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var("PORTCHECK_CONFIG_PATH") {
        return Ok(PathBuf::from(path));
    }
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(config_dir.join("portcheck").join("config.toml"))
}

/// Loads the config from disk, falling back to defaults if it doesn't exist.
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let config: Config = toml::from_str(&content).map_err(|source| ConfigError::ParseFailed {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(config)
}

/// Saves the config to disk using atomic write.
///
/// Writes to a temporary file first, syncs to disk, then renames it over the
/// target path.
fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    let parent = parent_dir(path)?;

    let content = toml::to_string_pretty(config).map_err(ConfigError::SerializeFailed)?;

    // Must live in the same directory for the rename to be atomic
    let temp_path = parent.join(".config.toml.tmp");

    let mut file = File::create(&temp_path).map_err(|source| ConfigError::WriteFailed {
        path: temp_path.clone(),
        source,
    })?;

    file.write_all(content.as_bytes())
        .map_err(|source| ConfigError::WriteFailed {
            path: temp_path.clone(),
            source,
        })?;

    file.sync_all().map_err(|source| ConfigError::WriteFailed {
        path: temp_path.clone(),
        source,
    })?;

    fs::rename(&temp_path, path).map_err(|source| ConfigError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Creates the directory holding `path` and returns it.
fn parent_dir(path: &Path) -> Result<&Path> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        Some(_) => Path::new("."),
        None => return Err(ConfigError::NoConfigDir.into()),
    };
    fs::create_dir_all(parent).map_err(|source| ConfigError::WriteFailed {
        path: parent.to_path_buf(),
        source,
    })?;
    Ok(parent)
}

/// Runs `f` on the config under an exclusive lock and saves the result.
///
/// The lock is held on a sibling `.lock` file for the whole
/// load-modify-save cycle. Nothing is written if `f` fails.
pub fn with_config_mut<T>(f: impl FnOnce(&mut Config) -> Result<T>) -> Result<T> {
    let path = config_path()?;
    with_config_mut_at(&path, f)
}

fn with_config_mut_at<T>(path: &Path, f: impl FnOnce(&mut Config) -> Result<T>) -> Result<T> {
    let lock_path = parent_dir(path)?.join(".config.toml.lock");
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|source| ConfigError::LockFailed {
            path: lock_path.clone(),
            source,
        })?;
    lock_file
        .lock_exclusive()
        .map_err(|source| ConfigError::LockFailed {
            path: lock_path.clone(),
            source,
        })?;

    let mut config = load_config_from(path)?;
    let value = f(&mut config)?;
    save_config_to(&config, path)?;

    // Dropping the file releases the lock as well
    let _ = FileExt::unlock(&lock_file);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendSpec;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(load_config_from(&path).unwrap(), Config::default());
        assert!(!path.exists());
    }

    #[test]
    fn test_mutation_is_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let name = with_config_mut_at(&path, |config| {
            let (name, _) = config.add_host("db=docker://postgres")?;
            Ok(name)
        })
        .unwrap();
        assert_eq!(name, "db");

        let config = load_config_from(&path).unwrap();
        assert_eq!(
            config.hosts.get("db"),
            Some(&BackendSpec::Docker {
                container: "postgres".to_string()
            })
        );
        assert!(!path.with_file_name(".config.toml.tmp").exists());
    }

    #[test]
    fn test_failed_mutation_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let result = with_config_mut_at(&path, |config| config.remove_host("missing"));
        assert!(matches!(result, Err(Error::Config(ConfigError::HostNotFound(_)))));
        assert!(!path.exists());
    }

    #[test]
    fn test_parse_error_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_backend = 42").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ParseFailed { .. })));
        assert!(err.to_string().contains("config.toml"));
    }
}
