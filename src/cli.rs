//! Command-line arguments.
use std::path::PathBuf;

use clap::Parser;

/// Command-line entry point for the module installer.
#[derive(Parser, Debug)]
#[command(
    name = "modinstall",
    about = "Declarative module installer with status tracking and rollback",
    version
)]
pub struct Cli {
    /// Path to the module manifest
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,

    /// Override the install directory from the manifest
    #[arg(long)]
    pub install_dir: Option<PathBuf>,

    /// Install only these modules (comma-separated), regardless of `enabled`
    #[arg(long, value_delimiter = ',')]
    pub module: Vec<String>,

    /// List configured modules and exit
    #[arg(long)]
    pub list_modules: bool,

    /// Overwrite existing targets and continue past failing modules
    #[arg(long)]
    pub force: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_defaults() {
        let cli = Cli::parse_from(["modinstall"]);
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert!(cli.install_dir.is_none());
        assert!(cli.module.is_empty());
        assert!(!cli.list_modules);
        assert!(!cli.force);
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_all_flags() {
        let cli = Cli::parse_from([
            "modinstall",
            "--install-dir",
            "/tmp/custom",
            "--module",
            "dev,bmad",
            "--config",
            "/tmp/cfg.json",
            "--list-modules",
            "--force",
        ]);
        assert_eq!(cli.install_dir, Some(PathBuf::from("/tmp/custom")));
        assert_eq!(cli.module, vec!["dev", "bmad"]);
        assert_eq!(cli.config, PathBuf::from("/tmp/cfg.json"));
        assert!(cli.list_modules);
        assert!(cli.force);
    }

    #[test]
    fn parse_repeated_module_flags() {
        let cli = Cli::parse_from(["modinstall", "--module", "dev", "--module", "essentials"]);
        assert_eq!(cli.module, vec!["dev", "essentials"]);
    }

    #[test]
    fn parse_verbose_short() {
        let cli = Cli::parse_from(["modinstall", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn reject_unknown_flag() {
        assert!(Cli::try_parse_from(["modinstall", "--dry-run"]).is_err());
    }
}
