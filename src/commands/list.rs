//! `--list-modules` output.
use std::fmt::Write as _;

use crate::config::Config;

/// Render one line per configured module: enabled marker, name, description.
#[must_use]
pub fn render(config: &Config) -> String {
    let width = config
        .modules
        .iter()
        .map(|m| m.name.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for module in &config.modules {
        let marker = if module.enabled { "✓" } else { "✗" };
        let line = format!("{marker} {:<width$}  {}", module.name, module.description);
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

/// Print the module list to stdout.
#[allow(clippy::print_stdout)]
pub fn run(config: &Config) {
    print!("{}", render(config));
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Module;

    fn module(name: &str, enabled: bool, description: &str) -> Module {
        Module {
            name: name.to_string(),
            enabled,
            description: description.to_string(),
            operations: Vec::new(),
        }
    }

    #[test]
    fn lists_modules_in_declaration_order() {
        let config = Config {
            version: "1.0".to_string(),
            install_dir: "~/.claude".to_string(),
            log_file: "install.log".to_string(),
            modules: vec![
                module("dev", true, "dev module"),
                module("bmad", false, "bmad"),
                module("essentials", true, ""),
            ],
        };
        insta::assert_snapshot!(render(&config).trim_end(), @r"
        ✓ dev         dev module
        ✗ bmad        bmad
        ✓ essentials
        ");
    }

    #[test]
    fn empty_config_renders_nothing() {
        let config = Config {
            version: "1.0".to_string(),
            install_dir: "~/.claude".to_string(),
            log_file: "install.log".to_string(),
            modules: Vec::new(),
        };
        assert_eq!(render(&config), "");
    }
}
