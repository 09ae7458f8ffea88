//! Core logging types: module entries, outcomes, and the [`Log`] trait.

/// Module execution result for summary reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    /// Module name.
    pub name: String,
    /// Final outcome of the module in this run.
    pub outcome: ModuleOutcome,
    /// Optional detail message (e.g. the failure cause).
    pub message: Option<String>,
}

/// Outcome of a module in the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleOutcome {
    /// Every operation succeeded or was skipped.
    Installed,
    /// An operation failed and the failure was recorded (`--force`).
    Failed,
    /// An operation failed and the module's changes were rolled back.
    RolledBack,
}

/// Abstraction over logging backends.
///
/// Executors and the orchestrator log through this trait so tests can swap
/// in a logger pointed at a temporary file.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Append captured process output verbatim.
    fn output(&self, text: &str);
    /// Record a module result for the summary.
    fn record_module(&self, name: &str, outcome: ModuleOutcome, message: Option<&str>);
    /// Print the summary of all recorded modules.
    fn print_summary(&self);
}
