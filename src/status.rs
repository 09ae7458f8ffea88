//! Persisted install status (`installed_modules.json`).
//!
//! The record maps module names to the result of their most recent install.
//! It is loaded once before a run, updated in memory as modules complete, and
//! either written once at the end of the run or restored verbatim from a
//! [`Snapshot`] when a module is rolled back.
use std::collections::BTreeMap;
use std::fs::Permissions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{Operation, OperationKind};
use crate::error::{ConfigError, InstallError};

/// Outcome of a single operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    /// The operation completed.
    Success,
    /// The operation failed; `detail` holds the error.
    Failed,
    /// The target already existed and `--force` was not given.
    Skipped,
}

/// Outcome of a whole module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleStatus {
    /// Every operation succeeded or was skipped.
    Success,
    /// An operation failed.
    Failed,
}

/// Result of one operation as persisted in the status file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    /// Operation type (`copy_file`, `copy_dir`, `run_command`).
    #[serde(rename = "type")]
    pub kind: OperationKind,
    /// Configured source path, for copy operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Configured target path, for copy operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Command line, for `run_command`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Operation outcome.
    pub status: OperationStatus,
    /// Skip reason or error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Whether this run wrote to the filesystem for this operation.
    #[serde(skip)]
    pub changed: bool,
}

impl OperationResult {
    /// A result for `op` with the given status and no detail.
    #[must_use]
    pub fn for_operation(op: &Operation, status: OperationStatus) -> Self {
        let (source, target, command) = match op {
            Operation::CopyFile { source, target } | Operation::CopyDir { source, target } => (
                Some(source.display().to_string()),
                Some(target.display().to_string()),
                None,
            ),
            Operation::RunCommand { command, .. } => (None, None, Some(command.clone())),
        };
        Self {
            kind: op.kind(),
            source,
            target,
            command,
            status,
            detail: None,
            changed: false,
        }
    }
}

/// Result of one module as persisted in the status file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleResult {
    /// Module name.
    pub module: String,
    /// Module outcome.
    pub status: ModuleStatus,
    /// Per-operation results, in execution order.
    pub operations: Vec<OperationResult>,
    /// When the module finished.
    pub installed_at: DateTime<Utc>,
}

/// The whole persisted status document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Latest result per module name.
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleResult>,
}

impl StatusRecord {
    /// Insert or replace the entry for `result.module`.
    pub fn record(&mut self, result: ModuleResult) {
        self.modules.insert(result.module.clone(), result);
    }
}

/// Load the status record at `path`.
///
/// # Errors
///
/// - [`ConfigError::CorruptStatus`] if the file exists but is not a valid record.
/// - [`InstallError::Io`] / [`InstallError::PermissionDenied`] if it cannot be read.
pub fn load(path: &Path) -> Result<StatusRecord, InstallError> {
    match std::fs::read(path) {
        Ok(bytes) => parse(path, &bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StatusRecord::default()),
        Err(e) => Err(InstallError::from_io("read", path, e)),
    }
}

fn parse(path: &Path, bytes: &[u8]) -> Result<StatusRecord, InstallError> {
    serde_json::from_slice(bytes).map_err(|source| {
        ConfigError::CorruptStatus {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

/// Serialize `record` as pretty JSON and atomically replace `path` with it.
///
/// # Errors
///
/// Returns an error if serialization fails or the file cannot be written.
pub fn write(path: &Path, record: &StatusRecord) -> Result<(), InstallError> {
    let mut json = serde_json::to_vec_pretty(record).map_err(|e| InstallError::Io {
        action: "serialize",
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    json.push(b'\n');
    let permissions = std::fs::metadata(path).ok().map(|m| m.permissions());
    write_atomic(path, &json, permissions)
}

/// Write `bytes` to a temporary file next to `path` and rename it into place.
///
/// The temporary file is created owner-only, so it is given `permissions`
/// (or the default for a new status file) before the rename.
fn write_atomic(
    path: &Path,
    bytes: &[u8],
    permissions: Option<Permissions>,
) -> Result<(), InstallError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp =
        tempfile::NamedTempFile::new_in(dir).map_err(|e| InstallError::from_io("create", dir, e))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| InstallError::from_io("write", tmp.path().to_path_buf(), e))?;
    #[cfg(unix)]
    let permissions = Some(permissions.unwrap_or_else(|| {
        use std::os::unix::fs::PermissionsExt as _;
        Permissions::from_mode(0o644)
    }));
    if let Some(permissions) = permissions {
        tmp.as_file()
            .set_permissions(permissions)
            .map_err(|e| InstallError::from_io("set permissions on", tmp.path().to_path_buf(), e))?;
    }
    tmp.persist(path)
        .map_err(|e| InstallError::from_io("replace", path, e.error))?;
    Ok(())
}

/// Exact pre-run contents and permissions of the status file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    path: PathBuf,
    contents: Option<Vec<u8>>,
    permissions: Option<Permissions>,
}

impl Snapshot {
    /// Capture the current bytes of `path`, or its absence.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn capture(path: &Path) -> Result<Self, InstallError> {
        let contents = match std::fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(InstallError::from_io("read", path, e)),
        };
        let permissions = std::fs::metadata(path).ok().map(|m| m.permissions());
        Ok(Self {
            path: path.to_path_buf(),
            contents,
            permissions,
        })
    }

    /// Parse the captured bytes as a status record (empty if there was no file).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CorruptStatus`] if the captured bytes are not a valid record.
    pub fn record(&self) -> Result<StatusRecord, InstallError> {
        self.contents
            .as_deref()
            .map_or_else(|| Ok(StatusRecord::default()), |bytes| parse(&self.path, bytes))
    }

    /// Put the status file back exactly as captured.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be rewritten or removed.
    pub fn restore(&self) -> Result<(), InstallError> {
        match &self.contents {
            Some(bytes) => write_atomic(&self.path, bytes, self.permissions.clone()),
            None => match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(InstallError::from_io("remove", self.path.clone(), e)),
            },
        }
    }
}
