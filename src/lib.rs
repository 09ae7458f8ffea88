//! Declarative module installer.
//!
//! Reads a JSON manifest of named modules, each an ordered list of file
//! copies, directory copies and shell commands, and installs the selected
//! modules into a target directory. Every run records its results in
//! `installed_modules.json`; a module that fails part-way is rolled back
//! unless `--force` is given.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]** — load and validate the manifest
//! - **[`resources`]** — per-operation executors (`copy_file`, `copy_dir`, `run_command`)
//! - **[`modules`]** — run one module, and roll it back on failure
//! - **[`status`]** — the persisted install record and its pre-run snapshot
//! - **[`commands`]** — module selection and run orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod exec;
pub mod logging;
pub mod modules;
pub mod resources;
pub mod status;
