//! Undo a failed module's filesystem changes and restore the status file.
//!
//! Rollback is a compensating-action pass, not a transaction log: copy
//! targets written during this run are deleted in reverse order, command
//! side effects are left in place, and the status file is put back exactly
//! as it was before the run.
use std::path::{Path, PathBuf};

use crate::config::OperationKind;
use crate::context::Context;
use crate::resources::helpers::fs::{normalize_lexically, remove_path};
use crate::status::{OperationResult, OperationStatus, Snapshot};

/// What a rollback pass did.
#[derive(Debug, Default)]
pub struct RollbackReport {
    /// Targets that were deleted.
    pub removed: Vec<PathBuf>,
    /// Problems hit along the way; logged, never fatal.
    pub errors: Vec<String>,
}

impl RollbackReport {
    /// Returns `true` if every step completed.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// One-line account for the run summary, e.g. `removed 2 path(s)`.
    #[must_use]
    pub fn summary(&self) -> String {
        let removed = format!("removed {} path(s)", self.removed.len());
        if self.is_clean() {
            removed
        } else {
            format!("{removed}, {} error(s)", self.errors.len())
        }
    }
}

/// Roll back `module` after a failure.
///
/// `operations` are the results the module produced before stopping, in
/// execution order. Errors are collected into the report and logged so they
/// never mask the failure that triggered the rollback.
pub fn rollback(
    module: &str,
    operations: &[OperationResult],
    ctx: &Context,
    snapshot: &Snapshot,
) -> RollbackReport {
    ctx.log.warn(&format!("Rolling back module {module}"));
    let mut report = RollbackReport::default();

    for op in operations.iter().rev() {
        match op.kind {
            OperationKind::CopyFile | OperationKind::CopyDir => {
                if op.status == OperationStatus::Skipped || !op.changed {
                    continue;
                }
                let Some(target) = op.target.as_deref() else {
                    continue;
                };
                let path = normalize_lexically(&ctx.target_path(Path::new(target)));
                match remove_path(&path) {
                    Ok(true) => {
                        ctx.log.info(&format!("Removed {}", path.display()));
                        report.removed.push(path);
                    }
                    Ok(false) => {}
                    Err(e) => {
                        let msg = format!("cannot remove {}: {e}", path.display());
                        ctx.log.error(&format!("Rollback: {msg}"));
                        report.errors.push(msg);
                    }
                }
            }
            OperationKind::RunCommand => {
                if op.status != OperationStatus::Skipped {
                    ctx.log.warn(&format!(
                        "Cannot undo command '{}'",
                        op.command.as_deref().unwrap_or_default()
                    ));
                }
            }
        }
    }

    if let Err(e) = snapshot.restore() {
        let msg = format!("cannot restore status file: {e}");
        ctx.log.error(&format!("Rollback: {msg}"));
        report.errors.push(msg);
    }

    if report.is_clean() {
        ctx.log.info(&format!("Rolled back module {module}"));
    } else {
        ctx.log.warn(&format!(
            "Rollback of module {module} incomplete ({} error(s))",
            report.errors.len()
        ));
    }
    report
}
