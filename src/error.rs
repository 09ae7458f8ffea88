//! Domain-specific error types for the installer.
//!
//! Internal modules return typed errors while `main` converts them to
//! [`anyhow::Error`] at the process boundary.
//!
//! # Error hierarchy
//!
//! ```text
//! InstallError
//! ├── Config(ConfigError)        — config file, operation shapes, module names, status file
//! ├── PermissionDenied           — install directory not writable
//! └── Io                         — other filesystem failures outside a module
//! ```
//!
//! Failures inside a module are [`ResourceError`](crate::resources::ResourceError)s
//! wrapped in a [`ModuleFailure`](crate::modules::ModuleFailure); they are
//! handled by the orchestrator rather than propagated as `InstallError`.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for a fatal installer failure.
#[derive(Error, Debug)]
pub enum InstallError {
    /// Configuration-related error; nothing has been mutated for the affected module.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The install directory (or a file the installer owns) cannot be written.
    #[error("permission denied: {}", path.display())]
    PermissionDenied {
        /// Path that could not be written.
        path: PathBuf,
    },

    /// Any other I/O failure outside module execution.
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        /// Short description of what was being attempted (e.g. `"write"`).
        action: &'static str,
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl InstallError {
    /// Build an [`InstallError`] from an I/O error, splitting out permission
    /// failures so callers can tell infrastructure problems apart.
    pub(crate) fn from_io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied { path }
        } else {
            Self::Io {
                action,
                path,
                source,
            }
        }
    }
}

/// Errors that arise from configuration loading, validation and module selection.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid JSON or does not match the expected shape.
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// An operation declares a `type` the installer does not know.
    #[error("module '{module}' operation #{index}: unknown operation type '{kind}'")]
    UnknownOperation {
        /// Module declaring the operation.
        module: String,
        /// Zero-based index of the operation within the module.
        index: usize,
        /// The unrecognized `type` value.
        kind: String,
    },

    /// An operation has a known type but missing or malformed fields.
    #[error("module '{module}' operation #{index}: {message}")]
    InvalidOperation {
        /// Module declaring the operation.
        module: String,
        /// Zero-based index of the operation within the module.
        index: usize,
        /// Human-readable description of the problem.
        message: String,
    },

    /// One or more module names requested explicitly do not exist.
    #[error("unknown module(s): {}", .0.join(", "))]
    UnknownModules(Vec<String>),

    /// The persisted status file exists but cannot be parsed.
    #[error("corrupt status file {}: {source}", path.display())]
    CorruptStatus {
        /// Path to the status file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The install directory path is occupied by something that is not a directory.
    #[error("install path exists and is not a directory: {}", .0.display())]
    InstallDirNotADirectory(PathBuf),

    /// The home directory is needed to expand `~` but cannot be determined.
    #[error("cannot expand '~' in {0}: home directory is unknown")]
    NoHomeDir(String),
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn unknown_modules_lists_every_name() {
        let e = ConfigError::UnknownModules(vec!["missing".to_string(), "other".to_string()]);
        assert_eq!(e.to_string(), "unknown module(s): missing, other");
    }

    #[test]
    fn unknown_operation_display() {
        let e = ConfigError::UnknownOperation {
            module: "dev".to_string(),
            index: 2,
            kind: "unknown_op".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "module 'dev' operation #2: unknown operation type 'unknown_op'"
        );
    }

    #[test]
    fn config_error_converts_into_install_error() {
        let e: InstallError = ConfigError::InstallDirNotADirectory(PathBuf::from("/tmp/x")).into();
        assert!(e.to_string().starts_with("configuration error:"));
        assert!(e.to_string().contains("/tmp/x"));
    }

    #[test]
    fn from_io_splits_permission_denied() {
        let e = InstallError::from_io(
            "write",
            "/etc/locked",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(e, InstallError::PermissionDenied { .. }));

        let e = InstallError::from_io(
            "write",
            "/etc/locked",
            io::Error::other("disk full"),
        );
        assert!(matches!(e, InstallError::Io { action: "write", .. }));
        assert!(e.to_string().contains("disk full"));
    }

    #[test]
    fn install_error_converts_to_anyhow() {
        let e = InstallError::from(ConfigError::UnknownModules(vec!["x".to_string()]));
        let _anyhow_err: anyhow::Error = e.into();
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<InstallError>();
        assert_send_sync::<ConfigError>();
    }
}
