//! Module selection and the install run.
use crate::cli::Cli;
use crate::config::{Config, Module};
use crate::context::{Context, ensure_install_dir};
use crate::error::{ConfigError, InstallError};
use crate::logging::ModuleOutcome;
use crate::modules::execute_module;
use crate::modules::rollback::rollback;
use crate::status::{self, Snapshot};

/// What happened to the selected modules.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    /// Modules that installed cleanly, in run order.
    pub installed: Vec<String>,
    /// Modules that failed under `--force` and were recorded as failed.
    pub failed: Vec<String>,
    /// Module whose failure stopped the run and was rolled back.
    pub rolled_back: Option<String>,
}

impl InstallOutcome {
    /// Process exit code: `1` after a rollback, `0` otherwise.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        u8::from(self.rolled_back.is_some())
    }
}

/// Pick the modules to run.
///
/// An explicit `requested` list runs exactly those modules in the given
/// order (duplicates dropped), enabled or not. An empty list runs every
/// enabled module in declaration order.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownModules`] naming every requested module
/// that does not exist.
pub fn select_modules<'a>(
    config: &'a Config,
    requested: &[String],
) -> Result<Vec<&'a Module>, ConfigError> {
    if requested.is_empty() {
        return Ok(config.modules.iter().filter(|m| m.enabled).collect());
    }

    let mut selected: Vec<&Module> = Vec::with_capacity(requested.len());
    let mut missing: Vec<String> = Vec::new();
    for name in requested {
        let name = name.trim();
        if name.is_empty() || selected.iter().any(|m| m.name == name) {
            continue;
        }
        match config.module(name) {
            Some(module) => selected.push(module),
            None if !missing.iter().any(|m| m == name) => missing.push(name.to_string()),
            None => {}
        }
    }

    if missing.is_empty() {
        Ok(selected)
    } else {
        Err(ConfigError::UnknownModules(missing))
    }
}

/// Run `modules` in order, rolling back the first failure unless `ctx.force`.
///
/// The status file is written once at the end of a run that did not roll
/// back; a rollback restores it to its pre-run bytes instead.
///
/// # Errors
///
/// Returns an error if the existing status file is unreadable or corrupt, or
/// the final status write fails. Module failures are reported through the
/// returned [`InstallOutcome`].
pub fn install_modules(modules: &[&Module], ctx: &Context) -> Result<InstallOutcome, InstallError> {
    let snapshot = Snapshot::capture(&ctx.status_file)?;
    let mut record = snapshot.record()?;
    let mut outcome = InstallOutcome::default();

    for module in modules {
        match execute_module(module, ctx) {
            Ok(result) => {
                ctx.log
                    .record_module(&module.name, ModuleOutcome::Installed, None);
                outcome.installed.push(module.name.clone());
                record.record(result);
            }
            Err(failure) if ctx.force => {
                let cause = failure.error.to_string();
                ctx.log
                    .record_module(&module.name, ModuleOutcome::Failed, Some(&cause));
                outcome.failed.push(module.name.clone());
                record.record(failure.into_result());
            }
            Err(failure) => {
                let report = rollback(&failure.module, &failure.operations, ctx, &snapshot);
                let detail = format!("{}; {}", failure.error, report.summary());
                ctx.log
                    .record_module(&module.name, ModuleOutcome::RolledBack, Some(&detail));
                outcome.rolled_back = Some(module.name.clone());
                return Ok(outcome);
            }
        }
    }

    status::write(&ctx.status_file, &record)?;
    ctx.log
        .debug(&format!("Status written to {}", ctx.status_file.display()));
    Ok(outcome)
}

/// Run the `install` flow for the parsed command line.
///
/// Every fatal check (manifest, module names, install directory) happens
/// before the first module runs.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded, a requested module
/// does not exist, the install directory is unusable, or the status file is
/// corrupt.
pub fn run(cli: &Cli) -> Result<InstallOutcome, InstallError> {
    let config = Config::load(&cli.config)?;
    let ctx = Context::resolve(&config, &cli.config, cli.install_dir.as_deref(), cli.force)?;
    let modules = select_modules(&config, &cli.module)?;
    ensure_install_dir(&ctx.install_dir)?;

    let version = option_env!("MODINSTALL_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    ctx.log.stage(&format!("modinstall {version}"));
    ctx.log.info(&format!("config: {}", cli.config.display()));
    ctx.log
        .info(&format!("install dir: {}", ctx.install_dir.display()));
    if ctx.force {
        ctx.log.info("force: existing targets will be overwritten");
    }
    let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();
    if names.is_empty() {
        ctx.log.warn("No modules selected");
    } else {
        ctx.log.info(&format!("modules: {}", names.join(", ")));
    }

    let outcome = install_modules(&modules, &ctx)?;
    ctx.log.print_summary();
    Ok(outcome)
}
