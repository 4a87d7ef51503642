//! Operating system family of the inspected host.

use tracing::debug;

use crate::backend::Backend;
use crate::error::BackendError;

/// Command used to identify the kernel family.
const UNAME_COMMAND: &str = "uname -s";

/// System information needed to pick a netstat flavor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    /// Lower-cased OS family, e.g. "linux", "freebsd", "darwin".
    pub os_type: String,
}

impl SystemInfo {
    /// Uses a known OS family instead of probing the host.
    pub fn new(os_type: &str) -> Self {
        Self {
            os_type: os_type.trim().to_lowercase(),
        }
    }

    /// Asks the host for its kernel name through the backend.
    pub fn detect(backend: &dyn Backend) -> Result<Self, BackendError> {
        let output = backend.run_expect(&[0], UNAME_COMMAND)?;
        let info = Self::new(output.trimmed_stdout());
        debug!(os_type = %info.os_type, "detected system type");
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::FakeBackend;

    #[test]
    fn test_new_normalizes() {
        assert_eq!(SystemInfo::new(" FreeBSD\n").os_type, "freebsd");
    }

    #[test]
    fn test_detect_uses_uname() {
        let backend = FakeBackend::new().with("uname -s", "Darwin\n");
        let info = SystemInfo::detect(&backend).unwrap();
        assert_eq!(info.os_type, "darwin");
        assert_eq!(*backend.calls.borrow(), vec!["uname -s".to_string()]);
    }

    #[test]
    fn test_detect_failure_propagates() {
        let backend = FakeBackend::new().with_status("uname -s", 127);
        assert!(SystemInfo::detect(&backend).is_err());
    }
}
