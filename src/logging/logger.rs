//! Run logger: console output through `tracing`, plus the per-run log file.
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::types::{Log, ModuleEntry, ModuleOutcome};
use super::utils::strip_ansi;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with summary collection.
///
/// Every message goes to the console via `tracing` and is appended to the
/// install log file as one `LEVEL: message` line, with ANSI codes stripped.
/// The file is opened in append mode for each write, so earlier runs are
/// kept and a missing parent directory is created on demand.
#[derive(Debug)]
pub struct Logger {
    log_file: PathBuf,
    modules: Mutex<Vec<ModuleEntry>>,
}

impl Logger {
    /// Create a logger that appends to `log_file`.
    ///
    /// Nothing is written until the first message.
    #[must_use]
    pub const fn new(log_file: PathBuf) -> Self {
        Self {
            log_file,
            modules: Mutex::new(Vec::new()),
        }
    }

    /// Path of the install log file.
    #[must_use]
    pub fn log_path(&self) -> &Path {
        &self.log_file
    }

    /// Append raw text to the log file, ensuring a trailing newline.
    ///
    /// Write failures are ignored: losing a log line must not fail an install.
    fn append(&self, text: &str) {
        if let Some(parent) = self.log_file.parent() {
            fs::create_dir_all(parent).ok();
        }
        if let Ok(mut f) = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
        {
            let clean = strip_ansi(text);
            if clean.ends_with('\n') {
                write!(f, "{clean}").ok();
            } else {
                writeln!(f, "{clean}").ok();
            }
        }
    }

    fn write_line(&self, level: &str, msg: &str) {
        self.append(&format!("{level}: {msg}"));
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
        self.write_line("ERROR", msg);
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
        self.write_line("WARNING", msg);
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: "modinstall::stage", "{msg}");
        self.write_line("INFO", msg);
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
        self.write_line("INFO", msg);
    }

    /// Log a debug message; always written to the file.
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
        self.write_line("DEBUG", msg);
    }

    /// Append captured command output verbatim.
    pub fn output(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        for line in text.lines() {
            tracing::debug!(target: "modinstall::output", "{line}");
        }
        self.append(text);
    }

    /// Record a module result for the summary.
    pub fn record_module(&self, name: &str, outcome: ModuleOutcome, message: Option<&str>) {
        if let Ok(mut guard) = self.modules.lock() {
            guard.push(ModuleEntry {
                name: name.to_string(),
                outcome,
                message: message.map(String::from),
            });
        }
    }

    /// Return a clone of all recorded module entries.
    #[must_use]
    pub fn module_entries(&self) -> Vec<ModuleEntry> {
        self.modules.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Print the summary of all recorded modules.
    pub fn print_summary(&self) {
        let entries = self.module_entries();
        if entries.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut installed = 0u32;
        let mut failed = 0u32;
        let mut rolled_back = 0u32;

        for entry in &entries {
            let icon = match entry.outcome {
                ModuleOutcome::Installed => {
                    installed += 1;
                    "✓"
                }
                ModuleOutcome::Failed => {
                    failed += 1;
                    "✗"
                }
                ModuleOutcome::RolledBack => {
                    rolled_back += 1;
                    "↺"
                }
            };
            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("{icon} {}{suffix}", entry.name));
        }

        let total = installed + failed + rolled_back;
        self.info(&format!(
            "{total} modules: {installed} installed, {failed} failed, {rolled_back} rolled back"
        ));
        self.info(&format!("log: {}", self.log_file.display()));
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, output);

    fn record_module(&self, name: &str, outcome: ModuleOutcome, message: Option<&str>) {
        self.record_module(name, outcome, message);
    }

    fn print_summary(&self) {
        self.print_summary();
    }
}
