//! Module execution: run a module's operations in order, stop at the first failure.
pub mod rollback;

use chrono::Utc;

use crate::config::Module;
use crate::context::Context;
use crate::resources::{self, ResourceError};
use crate::status::{ModuleResult, ModuleStatus, OperationResult};

/// A module that stopped on a failing operation.
#[derive(Debug, thiserror::Error)]
#[error("module '{module}' failed")]
pub struct ModuleFailure {
    /// Module name.
    pub module: String,
    /// Results of the operations that ran, ending with the failed one.
    pub operations: Vec<OperationResult>,
    /// Error raised by the failing operation.
    #[source]
    pub error: ResourceError,
}

impl ModuleFailure {
    /// The failure as a persisted module result (`status == failed`).
    #[must_use]
    pub fn into_result(self) -> ModuleResult {
        ModuleResult {
            module: self.module,
            status: ModuleStatus::Failed,
            operations: self.operations,
            installed_at: Utc::now(),
        }
    }
}

/// Run every operation of `module` in declared order.
///
/// # Errors
///
/// Returns a [`ModuleFailure`] at the first operation that fails; later
/// operations are not run.
pub fn execute_module(module: &Module, ctx: &Context) -> Result<ModuleResult, ModuleFailure> {
    ctx.log.stage(&format!("Installing module {}", module.name));

    let mut operations = Vec::with_capacity(module.operations.len());
    for op in &module.operations {
        match resources::execute(op, ctx) {
            Ok(result) => operations.push(result),
            Err(failure) => {
                ctx.log.error(&format!(
                    "Module {} failed on {}: {}",
                    module.name,
                    op.kind(),
                    failure.error
                ));
                operations.push(failure.result);
                return Err(ModuleFailure {
                    module: module.name.clone(),
                    operations,
                    error: failure.error,
                });
            }
        }
    }

    ctx.log
        .info(&format!("Module {} installed successfully", module.name));
    Ok(ModuleResult {
        module: module.name.clone(),
        status: ModuleStatus::Success,
        operations,
        installed_at: Utc::now(),
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::Operation;
    use crate::context::test_helpers::TestEnv;
    use crate::resources::test_helpers::MockExecutor;
    use crate::status::OperationStatus;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn module(operations: Vec<Operation>) -> Module {
        Module {
            name: "dev".to_string(),
            enabled: true,
            description: "Developer tools".to_string(),
            operations,
        }
    }

    fn copy(source: &str, target: &str) -> Operation {
        Operation::CopyFile {
            source: PathBuf::from(source),
            target: PathBuf::from(target),
        }
    }

    fn command(command: &str) -> Operation {
        Operation::RunCommand {
            command: command.to_string(),
            env: BTreeMap::new(),
        }
    }

    #[test]
    fn all_operations_succeed_in_order() {
        let env = TestEnv::new(false);
        env.source_file("a.txt", "a");
        env.source_file("b.txt", "b");
        let m = module(vec![copy("a.txt", "a.txt"), copy("b.txt", "b.txt")]);

        let result = execute_module(&m, &env.ctx).unwrap();
        assert_eq!(result.module, "dev");
        assert_eq!(result.status, ModuleStatus::Success);
        assert_eq!(result.operations.len(), 2);
        assert_eq!(result.operations[0].source.as_deref(), Some("a.txt"));
        assert_eq!(result.operations[1].source.as_deref(), Some("b.txt"));
        assert!(
            env.log_contents()
                .contains("INFO: Module dev installed successfully\n")
        );
    }

    #[test]
    fn stops_at_first_failure() {
        let env = TestEnv::new(false);
        env.source_file("a.txt", "a");
        env.source_file("c.txt", "c");
        let m = module(vec![
            copy("a.txt", "a.txt"),
            copy("missing.txt", "b.txt"),
            copy("c.txt", "c.txt"),
        ]);

        let failure = execute_module(&m, &env.ctx).unwrap_err();
        assert_eq!(failure.module, "dev");
        assert_eq!(failure.operations.len(), 2);
        assert_eq!(failure.operations[0].status, OperationStatus::Success);
        assert_eq!(failure.operations[1].status, OperationStatus::Failed);
        assert!(matches!(failure.error, ResourceError::MissingSource { .. }));
        assert!(!env.ctx.install_dir.join("c.txt").exists());
        assert!(
            env.log_contents()
                .contains("ERROR: Module dev failed on copy_file: source not found")
        );
    }

    #[test]
    fn command_failure_reports_returncode() {
        let TestEnv { tmp: _tmp, ctx } = TestEnv::new(false);
        let mock = Arc::new(MockExecutor::with_responses(vec![
            (0, String::new()),
            (5, String::new()),
        ]));
        let ctx = ctx.with_executor(mock.clone());
        let m = module(vec![command("true"), command("exit 5"), command("echo never")]);

        let failure = execute_module(&m, &ctx).unwrap_err();
        assert!(matches!(
            failure.error,
            ResourceError::CommandFailed { returncode: 5, .. }
        ));
        assert_eq!(mock.calls().len(), 2);

        let result = failure.into_result();
        assert_eq!(result.status, ModuleStatus::Failed);
        assert_eq!(result.operations.len(), 2);
        assert_eq!(
            result.operations[1].detail.as_deref(),
            Some("command 'exit 5' failed with returncode 5")
        );
    }

    #[test]
    fn empty_module_succeeds() {
        let env = TestEnv::new(false);
        let result = execute_module(&module(Vec::new()), &env.ctx).unwrap();
        assert_eq!(result.status, ModuleStatus::Success);
        assert!(result.operations.is_empty());
    }
}
