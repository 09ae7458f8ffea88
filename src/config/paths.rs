//! Home-directory expansion and base-relative path resolution.
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Expand a leading `~` or `~/` to the current user's home directory.
///
/// Other paths (including `~user` forms, which are not supported) are
/// returned unchanged.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDir`] if the path needs expanding but the
/// home directory cannot be determined.
pub fn expand_home(raw: &Path) -> Result<PathBuf, ConfigError> {
    let Ok(rest) = raw.strip_prefix("~") else {
        return Ok(raw.to_path_buf());
    };
    let home =
        dirs::home_dir().ok_or_else(|| ConfigError::NoHomeDir(raw.display().to_string()))?;
    Ok(if rest.as_os_str().is_empty() {
        home
    } else {
        home.join(rest)
    })
}

/// Resolve `raw` against `base` after home expansion.
///
/// Absolute paths (after expansion) ignore `base`.
///
/// # Errors
///
/// Propagates [`expand_home`] failures.
pub fn resolve_under(base: &Path, raw: &Path) -> Result<PathBuf, ConfigError> {
    Ok(base.join(expand_home(raw)?))
}
