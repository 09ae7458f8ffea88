//! Shell command execution.
use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, Output};

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status 0.
    pub success: bool,
    /// Exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

impl ExecResult {
    /// Exit code, or `-1` when the process was terminated by a signal.
    #[must_use]
    pub fn returncode(&self) -> i32 {
        self.code.unwrap_or(-1)
    }

    /// Stdout followed by stderr, as written to the install log.
    #[must_use]
    pub fn combined_output(&self) -> String {
        let mut out = self.stdout.clone();
        if !out.is_empty() && !out.ends_with('\n') && !self.stderr.is_empty() {
            out.push('\n');
        }
        out.push_str(&self.stderr);
        out
    }
}

/// Runs shell commands on behalf of `run_command` operations.
///
/// The production implementation is [`SystemExecutor`]; tests substitute a
/// scripted executor so command operations can be exercised without a shell.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run `command` through the platform shell with `dir` as the working
    /// directory and `env` layered over the inherited environment.
    ///
    /// A non-zero exit is reported through [`ExecResult::success`], not as
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell cannot be spawned or its output cannot
    /// be collected.
    fn run_shell(
        &self,
        command: &str,
        dir: &Path,
        env: &BTreeMap<String, String>,
    ) -> std::io::Result<ExecResult>;
}

/// [`Executor`] that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

/// Build the platform shell invocation for `command`.
fn shell_command(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    }
    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}

impl Executor for SystemExecutor {
    fn run_shell(
        &self,
        command: &str,
        dir: &Path,
        env: &BTreeMap<String, String>,
    ) -> std::io::Result<ExecResult> {
        let mut cmd = shell_command(command);
        cmd.current_dir(dir).envs(env);
        cmd.output().map(ExecResult::from)
    }
}
