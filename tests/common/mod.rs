// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed installer workspace and a fluent
// builder so each integration test can set up an isolated manifest, source
// tree and install directory without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use clap::Parser;
use modinstall::cli::Cli;
use modinstall::status::{self, StatusRecord};
use serde_json::{Value, json};

/// Write the sample sources used by most tests into `root`.
///
/// Creates:
/// - `sample.txt`          — a single file (`hello`)
/// - `sample_dir/f.txt`    — a one-file directory tree (`dir`)
pub fn setup_sources(root: &Path) {
    std::fs::write(root.join("sample.txt"), "hello").expect("write sample.txt");
    std::fs::create_dir_all(root.join("sample_dir")).expect("create sample_dir");
    std::fs::write(root.join("sample_dir").join("f.txt"), "dir").expect("write sample_dir/f.txt");
}

/// The five-module manifest used across scenarios: `dev` and `essentials`
/// enabled, `bmad`, `requirements` and `advanced` disabled.
pub fn sample_manifest() -> Value {
    json!({
        "version": "1.0",
        "install_dir": "~/.fromconfig",
        "log_file": "install.log",
        "modules": {
            "dev": {
                "enabled": true,
                "description": "dev module",
                "operations": [
                    {"type": "copy_dir", "source": "sample_dir", "target": "devcopy"}
                ]
            },
            "bmad": {
                "enabled": false,
                "description": "bmad",
                "operations": [
                    {"type": "copy_file", "source": "sample.txt", "target": "bmad.txt"}
                ]
            },
            "requirements": {
                "enabled": false,
                "description": "reqs",
                "operations": [
                    {"type": "copy_file", "source": "sample.txt", "target": "req.txt"}
                ]
            },
            "essentials": {
                "enabled": true,
                "description": "ess",
                "operations": [
                    {"type": "copy_file", "source": "sample.txt", "target": "ess.txt"}
                ]
            },
            "advanced": {
                "enabled": false,
                "description": "adv",
                "operations": [
                    {"type": "copy_file", "source": "sample.txt", "target": "adv.txt"}
                ]
            }
        }
    })
}

/// An isolated installer workspace backed by a [`tempfile::TempDir`].
///
/// The manifest lives at `<root>/config.json` (so sources resolve against
/// `<root>`) and installs go to `<root>/install`.
pub struct IntegrationTestContext {
    /// Temporary directory holding the manifest, sources and install dir.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Path to the workspace root (the config directory).
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Path of the manifest.
    pub fn config_path(&self) -> PathBuf {
        self.root.path().join("config.json")
    }

    /// Path of the install directory passed via `--install-dir`.
    pub fn install_dir(&self) -> PathBuf {
        self.root.path().join("install")
    }

    /// Path of the status record inside the install directory.
    pub fn status_path(&self) -> PathBuf {
        self.install_dir().join("installed_modules.json")
    }

    /// Path of the install log.
    pub fn log_path(&self) -> PathBuf {
        self.install_dir().join("install.log")
    }

    /// Parse a command line against this workspace.
    ///
    /// `--config` and `--install-dir` are filled in; `extra` is appended.
    pub fn cli(&self, extra: &[&str]) -> Cli {
        let config = self.config_path();
        let install = self.install_dir();
        let mut args = vec![
            "modinstall".to_string(),
            "--config".to_string(),
            config.display().to_string(),
            "--install-dir".to_string(),
            install.display().to_string(),
        ];
        args.extend(extra.iter().map(|s| (*s).to_string()));
        Cli::parse_from(args)
    }

    /// Load the status record.
    pub fn status(&self) -> StatusRecord {
        status::load(&self.status_path()).expect("load status")
    }

    /// Raw bytes of the status file, if present.
    pub fn status_bytes(&self) -> Option<Vec<u8>> {
        std::fs::read(self.status_path()).ok()
    }

    /// Contents of the install log (empty if nothing was written).
    pub fn log(&self) -> String {
        std::fs::read_to_string(self.log_path()).unwrap_or_default()
    }

    /// Replace the manifest.
    pub fn write_manifest(&self, manifest: &Value) {
        std::fs::write(
            self.config_path(),
            serde_json::to_string_pretty(manifest).expect("serialize manifest"),
        )
        .expect("write config.json");
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
    manifest: Value,
}

impl TestContextBuilder {
    /// Begin building a workspace with the sample sources and manifest.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        setup_sources(root.path());
        Self {
            ctx: IntegrationTestContext { root },
            manifest: sample_manifest(),
        }
    }

    /// Use `manifest` instead of [`sample_manifest`].
    pub fn with_manifest(mut self, manifest: Value) -> Self {
        self.manifest = manifest;
        self
    }

    /// Write a source file relative to the workspace root.
    pub fn with_source(self, rel: &str, content: &str) -> Self {
        let path = self.ctx.root.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create source parent");
        }
        std::fs::write(&path, content).expect("write source file");
        self
    }

    /// Pre-populate a file inside the install directory.
    pub fn with_installed(self, rel: &str, content: &str) -> Self {
        let path = self.ctx.install_dir().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create installed parent");
        }
        std::fs::write(&path, content).expect("write installed file");
        self
    }

    /// Finish building: write the manifest and return the context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx.write_manifest(&self.manifest);
        self.ctx
    }
}
