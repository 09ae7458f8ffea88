//! `modinstall` command-line entry point.
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use modinstall::{cli, commands, logging};

fn main() -> Result<ExitCode> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose);

    commands::run(&args)
}
