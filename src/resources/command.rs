//! Shell command resource.
use std::collections::BTreeMap;
use std::path::Path;

use super::{Applicable, ResourceChange, ResourceError};
use crate::exec::Executor;
use crate::logging::Log;

/// A shell command run in the install directory.
///
/// Commands are not idempotent: they run on every install and `force` has no
/// effect on them.
pub struct CommandResource<'a> {
    command: &'a str,
    env: &'a BTreeMap<String, String>,
    dir: &'a Path,
    executor: &'a dyn Executor,
    log: &'a dyn Log,
}

impl std::fmt::Debug for CommandResource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandResource")
            .field("command", &self.command)
            .field("env", &self.env)
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

impl<'a> CommandResource<'a> {
    /// Create a command resource running `command` in `dir` with `env` overrides.
    #[must_use]
    pub const fn new(
        command: &'a str,
        env: &'a BTreeMap<String, String>,
        dir: &'a Path,
        executor: &'a dyn Executor,
        log: &'a dyn Log,
    ) -> Self {
        Self {
            command,
            env,
            dir,
            executor,
            log,
        }
    }
}

impl Applicable for CommandResource<'_> {
    fn description(&self) -> String {
        self.command.to_string()
    }

    fn apply(&self) -> Result<ResourceChange, ResourceError> {
        self.log.info(&format!("Running command: {}", self.command));
        let result = self
            .executor
            .run_shell(self.command, self.dir, self.env)
            .map_err(|e| ResourceError::io("run command in", self.dir, e))?;

        self.log.output(&result.combined_output());
        if result.success {
            return Ok(ResourceChange::Applied);
        }

        let returncode = result.returncode();
        self.log.output(&format!("returncode: {returncode}"));
        Err(ResourceError::CommandFailed {
            command: self.command.to_string(),
            returncode,
        })
    }
}
