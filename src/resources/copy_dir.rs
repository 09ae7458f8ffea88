//! Directory-tree copy resource.
use std::path::PathBuf;

use super::helpers::fs::{copy_dir_recursive, ensure_parent_dir, remove_path};
use super::{Applicable, ResourceChange, ResourceError};

/// A directory tree to copy into the install directory.
///
/// The tree is treated as a unit: an existing target is either skipped as a
/// whole or, with `force`, replaced as a whole. Files are never merged.
#[derive(Debug, Clone)]
pub struct CopyDirResource {
    /// Resolved source directory.
    pub source: PathBuf,
    /// Resolved destination directory.
    pub target: PathBuf,
    /// Replace an existing target.
    pub force: bool,
}

impl CopyDirResource {
    /// Create a new copy-dir resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf, force: bool) -> Self {
        Self {
            source,
            target,
            force,
        }
    }
}

impl Applicable for CopyDirResource {
    fn description(&self) -> String {
        format!("{}/ -> {}/", self.source.display(), self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange, ResourceError> {
        if !self.source.is_dir() {
            return Err(ResourceError::MissingSource {
                path: self.source.clone(),
            });
        }

        if self.target.symlink_metadata().is_ok() {
            if !self.force {
                return Ok(ResourceChange::Skipped {
                    reason: "target exists".to_string(),
                });
            }
            remove_path(&self.target).map_err(|e| ResourceError::io("remove", &self.target, e))?;
        }

        ensure_parent_dir(&self.target)?;
        copy_dir_recursive(&self.source, &self.target)?;
        Ok(ResourceChange::Applied)
    }
}
