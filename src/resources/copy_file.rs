//! Single-file copy resource.
use std::path::PathBuf;

use super::helpers::fs::ensure_parent_dir;
use super::{Applicable, ResourceChange, ResourceError};

/// A file to copy into the install directory.
#[derive(Debug, Clone)]
pub struct CopyFileResource {
    /// Resolved source file.
    pub source: PathBuf,
    /// Resolved destination path.
    pub target: PathBuf,
    /// Overwrite an existing target.
    pub force: bool,
}

impl CopyFileResource {
    /// Create a new copy-file resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf, force: bool) -> Self {
        Self {
            source,
            target,
            force,
        }
    }
}

impl Applicable for CopyFileResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.source.display(), self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange, ResourceError> {
        if !self.source.is_file() {
            return Err(ResourceError::MissingSource {
                path: self.source.clone(),
            });
        }

        // symlink_metadata so a dangling link still counts as occupied
        if self.target.symlink_metadata().is_ok() {
            if !self.force {
                return Ok(ResourceChange::Skipped {
                    reason: "target exists".to_string(),
                });
            }
            // A forced file copy never replaces a directory tree.
            if self.target.is_dir() {
                return Err(ResourceError::TargetIsDirectory {
                    path: self.target.clone(),
                });
            }
        }

        ensure_parent_dir(&self.target)?;
        std::fs::copy(&self.source, &self.target)
            .map_err(|e| ResourceError::io("copy", &self.target, e))?;
        Ok(ResourceChange::Applied)
    }
}
