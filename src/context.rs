//! Execution context shared by every operation in a run.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::config::paths::{expand_home, resolve_under};
use crate::error::{ConfigError, InstallError};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};

/// File name of the persisted status record inside the install directory.
pub const STATUS_FILE_NAME: &str = "installed_modules.json";

/// Resolved paths and flags for one installer invocation.
///
/// Built once from the manifest plus command-line overrides and never
/// mutated afterwards. Operations resolve their paths against it instead of
/// changing the process working directory.
pub struct Context {
    /// Absolute install directory.
    pub install_dir: PathBuf,
    /// Absolute path of the install log.
    pub log_file: PathBuf,
    /// Absolute path of the status record (`<install_dir>/installed_modules.json`).
    pub status_file: PathBuf,
    /// Directory containing the manifest; base for relative `source` paths.
    pub config_dir: PathBuf,
    /// Overwrite existing targets and keep going after module failures.
    pub force: bool,
    /// Logger for console output and the install log.
    pub log: Arc<dyn Log>,
    /// Command executor (real processes, or a stub in tests).
    pub executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("install_dir", &self.install_dir)
            .field("log_file", &self.log_file)
            .field("status_file", &self.status_file)
            .field("config_dir", &self.config_dir)
            .field("force", &self.force)
            .field("log", &"<dyn Log>")
            .field("executor", &self.executor)
            .finish()
    }
}

impl Context {
    /// Create a context from already-resolved absolute paths, logging to
    /// `log_file` and running commands with the [`SystemExecutor`].
    #[must_use]
    pub fn new(install_dir: PathBuf, log_file: PathBuf, config_dir: PathBuf, force: bool) -> Self {
        let status_file = install_dir.join(STATUS_FILE_NAME);
        let log: Arc<dyn Log> = Arc::new(Logger::new(log_file.clone()));
        Self {
            install_dir,
            log_file,
            status_file,
            config_dir,
            force,
            log,
            executor: Arc::new(SystemExecutor),
        }
    }

    /// Resolve the context for `config`, loaded from `config_path`.
    ///
    /// `install_dir_override` (from the command line) wins over the
    /// manifest's `install_dir`. The log file is resolved against the final
    /// install directory unless it is absolute.
    ///
    /// # Errors
    ///
    /// Returns an error if `~` cannot be expanded or a path cannot be made
    /// absolute.
    pub fn resolve(
        config: &Config,
        config_path: &Path,
        install_dir_override: Option<&Path>,
        force: bool,
    ) -> Result<Self, InstallError> {
        let raw_install_dir = install_dir_override.unwrap_or_else(|| Path::new(&config.install_dir));
        let install_dir = absolute(&expand_home(raw_install_dir)?)?;
        let log_file = resolve_under(&install_dir, Path::new(&config.log_file))?;

        let config_path = absolute(config_path)?;
        let config_dir = config_path
            .parent()
            .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);

        Ok(Self::new(install_dir, log_file, config_dir, force))
    }

    /// Replace the command executor.
    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }

    /// Resolve an operation `source` against the config directory.
    #[must_use]
    pub fn source_path(&self, source: &Path) -> PathBuf {
        self.config_dir.join(source)
    }

    /// Resolve an operation `target` against the install directory.
    #[must_use]
    pub fn target_path(&self, target: &Path) -> PathBuf {
        self.install_dir.join(target)
    }
}

fn absolute(path: &Path) -> Result<PathBuf, InstallError> {
    std::path::absolute(path).map_err(|e| InstallError::from_io("resolve", path, e))
}

/// Create the install directory if needed and check that it is writable.
///
/// # Errors
///
/// - [`ConfigError::InstallDirNotADirectory`] if the path exists but is not a directory.
/// - [`InstallError::PermissionDenied`] if the directory cannot be created or written.
pub fn ensure_install_dir(path: &Path) -> Result<(), InstallError> {
    if path.exists() && !path.is_dir() {
        return Err(ConfigError::InstallDirNotADirectory(path.to_path_buf()).into());
    }
    std::fs::create_dir_all(path).map_err(|e| InstallError::from_io("create", path, e))?;

    // Probe with a real file: permission bits alone miss ACLs and read-only mounts.
    tempfile::Builder::new()
        .prefix(".modinstall-probe")
        .tempfile_in(path)
        .map(drop)
        .map_err(|e| InstallError::from_io("write to", path, e))
}

/// Shared helpers for unit tests that need a context.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub mod test_helpers {
    use super::Context;

    /// A context rooted in a fresh temporary directory.
    ///
    /// Layout: `<tmp>/config` is the config directory, `<tmp>/install` the
    /// (already created) install directory, and the log is
    /// `<tmp>/install/install.log`.
    #[derive(Debug)]
    pub struct TestEnv {
        /// Owns the temporary directory; dropping it removes everything.
        pub tmp: tempfile::TempDir,
        /// Context rooted in `tmp`.
        pub ctx: Context,
    }

    impl TestEnv {
        /// Create the directories and a context with the given `force` flag.
        pub fn new(force: bool) -> Self {
            let tmp = tempfile::tempdir().expect("create temp dir");
            let config_dir = tmp.path().join("config");
            let install_dir = tmp.path().join("install");
            std::fs::create_dir_all(&config_dir).expect("create config dir");
            std::fs::create_dir_all(&install_dir).expect("create install dir");
            let ctx = Context::new(
                install_dir.clone(),
                install_dir.join("install.log"),
                config_dir,
                force,
            );
            Self { tmp, ctx }
        }

        /// Write a source file relative to the config directory.
        pub fn source_file(&self, rel: &str, content: &str) {
            let path = self.ctx.config_dir.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("create source parent");
            }
            std::fs::write(path, content).expect("write source file");
        }

        /// Contents of the install log so far (empty if nothing was logged).
        pub fn log_contents(&self) -> String {
            std::fs::read_to_string(&self.ctx.log_file).unwrap_or_default()
        }
    }
}
