//! Typed error variants for operation executors.
//!
//! A [`ResourceError`] fails the operation that raised it and, through the
//! module executor, the whole module. The orchestrator decides whether that
//! leads to a rollback or to a recorded failure under `--force`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise while applying a single operation.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The operation's source file or directory does not exist.
    #[error("source not found: {}", path.display())]
    MissingSource {
        /// Resolved source path.
        path: PathBuf,
    },

    /// A `copy_file` target is an existing directory.
    #[error("target is a directory: {}", path.display())]
    TargetIsDirectory {
        /// Resolved target path.
        path: PathBuf,
    },

    /// A copy target resolves to the install directory or one of its ancestors.
    #[error("target would replace the install directory: {}", path.display())]
    UnsafeTarget {
        /// Resolved target path.
        path: PathBuf,
    },

    /// A shell command exited with a non-zero status.
    #[error("command '{command}' failed with returncode {returncode}")]
    CommandFailed {
        /// Command line as configured.
        command: String,
        /// Exit code, or `-1` if the process was killed by a signal.
        returncode: i32,
    },

    /// The filesystem refused access.
    #[error("permission denied: {}", path.display())]
    PermissionDenied {
        /// Path for which permission was denied.
        path: PathBuf,
    },

    /// Any other I/O failure.
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        /// Short description of what was being attempted (e.g. `"copy"`).
        action: &'static str,
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl ResourceError {
    /// Build a [`ResourceError`] from an I/O error, splitting out permission failures.
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
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

    /// Whether the failing operation may already have written to its target.
    ///
    /// Source and target checks happen before anything is written, so
    /// those failures never leave partial state behind.
    #[must_use]
    pub const fn left_partial_state(&self) -> bool {
        !matches!(
            self,
            Self::MissingSource { .. } | Self::TargetIsDirectory { .. } | Self::UnsafeTarget { .. }
        )
    }
}
