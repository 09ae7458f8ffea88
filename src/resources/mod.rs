//! Operation executors (apply pattern).
//!
//! Each [`Operation`] variant is backed by a resource type implementing
//! [`Applicable`]. [`execute`] builds the resource for an operation, applies
//! it, logs the outcome and turns it into an [`OperationResult`].
pub mod command;
pub mod copy_dir;
pub mod copy_file;
pub mod error;
pub mod helpers;

pub use error::ResourceError;

use std::path::{Path, PathBuf};

use crate::config::Operation;
use crate::context::Context;
use crate::status::{OperationResult, OperationStatus};

use command::CommandResource;
use copy_dir::CopyDirResource;
use copy_file::CopyFileResource;

/// Interface for resources that can be described and applied.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// This method should:
    /// - Check preconditions (e.g. the source exists) before writing anything
    /// - Create parent directories if needed
    /// - Return [`ResourceChange::Skipped`] instead of overwriting when not forced
    ///
    /// # Errors
    ///
    /// Returns an error if the source is missing, a command fails, or the
    /// filesystem rejects a write.
    fn apply(&self) -> Result<ResourceChange, ResourceError>;
}

/// Result of applying a resource change.
///
/// # Examples
///
/// ```
/// use modinstall::resources::ResourceChange;
///
/// let applied = ResourceChange::Applied;
/// let skipped = ResourceChange::Skipped { reason: "target exists".into() };
///
/// assert_eq!(applied, ResourceChange::Applied);
/// assert_ne!(applied, skipped);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created, overwritten or run.
    Applied,
    /// Resource was left alone (no-clobber).
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// A failed operation: its recorded result plus the cause.
#[derive(Debug)]
pub struct OperationFailure {
    /// Result with `status == failed` and the error as `detail`.
    pub result: OperationResult,
    /// Error raised by the executor.
    pub error: ResourceError,
}

/// Execute one operation in `ctx`.
///
/// # Errors
///
/// Returns an [`OperationFailure`] carrying the failed result and its cause.
pub fn execute(op: &Operation, ctx: &Context) -> Result<OperationResult, OperationFailure> {
    match op {
        Operation::CopyFile { source, target } => {
            let target = copy_target(ctx, target).map_err(|error| failed(op, error))?;
            let resource = CopyFileResource::new(ctx.source_path(source), target, ctx.force);
            apply_resource(op, &resource, ctx)
        }
        Operation::CopyDir { source, target } => {
            let target = copy_target(ctx, target).map_err(|error| failed(op, error))?;
            let resource = CopyDirResource::new(ctx.source_path(source), target, ctx.force);
            apply_resource(op, &resource, ctx)
        }
        Operation::RunCommand { command, env } => {
            let resource = CommandResource::new(
                command,
                env,
                &ctx.install_dir,
                ctx.executor.as_ref(),
                ctx.log.as_ref(),
            );
            apply_resource(op, &resource, ctx)
        }
    }
}

/// Resolve a copy target, refusing the install directory and its ancestors.
fn copy_target(ctx: &Context, target: &Path) -> Result<PathBuf, ResourceError> {
    let path = helpers::fs::normalize_lexically(&ctx.target_path(target));
    if helpers::fs::covers(&path, &ctx.install_dir) {
        return Err(ResourceError::UnsafeTarget { path });
    }
    Ok(path)
}

fn failed(op: &Operation, error: ResourceError) -> OperationFailure {
    let mut result = OperationResult::for_operation(op, OperationStatus::Failed);
    result.detail = Some(error.to_string());
    result.changed = error.left_partial_state();
    OperationFailure { result, error }
}

/// Apply a single resource and record the outcome.
fn apply_resource<R: Applicable>(
    op: &Operation,
    resource: &R,
    ctx: &Context,
) -> Result<OperationResult, OperationFailure> {
    let desc = resource.description();
    ctx.log.debug(&format!("{}: {desc}", op.kind()));

    match resource.apply() {
        Ok(ResourceChange::Applied) => {
            ctx.log.info(&format!("{} completed: {desc}", op.kind()));
            let mut result = OperationResult::for_operation(op, OperationStatus::Success);
            result.changed = true;
            Ok(result)
        }
        Ok(ResourceChange::Skipped { reason }) => {
            ctx.log.info(&format!("Skipping {desc}: {reason}"));
            let mut result = OperationResult::for_operation(op, OperationStatus::Skipped);
            result.detail = Some(reason);
            Ok(result)
        }
        Err(error) => Err(failed(op, error)),
    }
}

/// Shared test helpers for resource unit tests.
///
/// Provides a scripted [`MockExecutor`] so command operations can be tested
/// without spawning a shell.
#[cfg(test)]
pub mod test_helpers {
    use crate::exec::{ExecResult, Executor};
    use std::collections::{BTreeMap, VecDeque};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// One recorded [`Executor::run_shell`] call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedCall {
        /// Command line passed to the shell.
        pub command: String,
        /// Working directory.
        pub dir: PathBuf,
        /// Environment overrides.
        pub env: BTreeMap<String, String>,
    }

    /// A configurable mock executor.
    ///
    /// Maintains a queue of `(code, stdout)` responses consumed in FIFO
    /// order. When the queue is empty any call fails to spawn.
    #[derive(Debug, Default)]
    pub struct MockExecutor {
        responses: Mutex<VecDeque<(i32, String)>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockExecutor {
        /// Create a mock whose single call exits 0 with `stdout`.
        #[must_use]
        pub fn ok(stdout: &str) -> Self {
            Self::with_responses(vec![(0, stdout.to_string())])
        }

        /// Create a mock whose single call exits with `code` and no output.
        #[must_use]
        pub fn exit(code: i32) -> Self {
            Self::with_responses(vec![(code, String::new())])
        }

        /// Create a mock from an ordered list of `(code, stdout)` pairs.
        #[must_use]
        pub fn with_responses(responses: Vec<(i32, String)>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Every call made so far.
        #[must_use]
        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().map_or_else(|_| vec![], |g| g.clone())
        }
    }

    impl Executor for MockExecutor {
        fn run_shell(
            &self,
            command: &str,
            dir: &Path,
            env: &BTreeMap<String, String>,
        ) -> std::io::Result<ExecResult> {
            if let Ok(mut guard) = self.calls.lock() {
                guard.push(RecordedCall {
                    command: command.to_string(),
                    dir: dir.to_path_buf(),
                    env: env.clone(),
                });
            }
            let next = self
                .responses
                .lock()
                .ok()
                .and_then(|mut guard| guard.pop_front());
            let Some((code, stdout)) = next else {
                return Err(std::io::Error::other("unexpected call"));
            };
            Ok(ExecResult {
                stdout,
                stderr: String::new(),
                success: code == 0,
                code: Some(code),
            })
        }
    }
}
