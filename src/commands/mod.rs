//! Top-level command orchestration.
pub mod install;
pub mod list;

use std::process::ExitCode;

use anyhow::Result;

use crate::cli::Cli;
use crate::config::Config;

/// Dispatch the parsed command line and return the process exit code.
///
/// # Errors
///
/// Returns an error for any fatal problem: unreadable manifest, unknown
/// module, unusable install directory or corrupt status file.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    if cli.list_modules {
        let config = Config::load(&cli.config)?;
        list::run(&config);
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = install::run(cli)?;
    Ok(ExitCode::from(outcome.exit_code()))
}
