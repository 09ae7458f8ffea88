//! File-system helpers shared by the copy executors and rollback.
use std::path::{Component, Path, PathBuf};

use crate::resources::ResourceError;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), ResourceError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ResourceError::io("create", parent, e))?;
    }
    Ok(())
}

/// Recursively copy a directory tree.
///
/// Symlinks within the source tree are *followed*: the function uses
/// [`Path::is_dir`] (which follows symlinks) so directory symlinks are
/// recursed into and their contents materialised rather than copying the
/// link itself.
///
/// # Errors
///
/// Returns an error if the destination directory cannot be created, a source
/// entry cannot be read, or a file cannot be copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), ResourceError> {
    std::fs::create_dir_all(dst).map_err(|e| ResourceError::io("create", dst, e))?;
    for entry in std::fs::read_dir(src).map_err(|e| ResourceError::io("read", src, e))? {
        let entry = entry.map_err(|e| ResourceError::io("read", src, e))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)
                .map_err(|e| ResourceError::io("copy", &dst_path, e))?;
        }
    }
    Ok(())
}

/// Remove a file, symlink or directory tree at `path`.
///
/// Returns `Ok(false)` if nothing was there.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_path(path: &Path) -> std::io::Result<bool> {
    let meta = match path.symlink_metadata() {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if meta.is_dir() {
        std::fs::remove_dir_all(path)?;
    } else {
        std::fs::remove_file(path)?;
    }
    Ok(true)
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root. Symlinks are not resolved.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

/// Whether removing or replacing `target` would take `dir` with it.
#[must_use]
pub fn covers(target: &Path, dir: &Path) -> bool {
    normalize_lexically(dir).starts_with(normalize_lexically(target))
}
