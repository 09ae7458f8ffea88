//! Module manifest loading.
//!
//! The manifest is a JSON document (conventionally `config.json`) listing
//! named modules, each an ordered list of operations. Loading happens in two
//! steps: the document is deserialized into a loose shape that keeps module
//! declaration order, then every operation is checked by [`validation`] and
//! converted into the closed [`Operation`] type.
pub mod paths;
pub mod validation;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{Error as _, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Install directory used when the manifest does not name one.
pub const DEFAULT_INSTALL_DIR: &str = "~/.claude";

/// Log file name used when the manifest does not name one.
pub const DEFAULT_LOG_FILE: &str = "install.log";

/// A fully validated module manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Manifest format version, carried through unchanged.
    pub version: String,
    /// Install directory as written in the manifest (may start with `~`).
    pub install_dir: String,
    /// Log file path, relative to the install directory unless absolute.
    pub log_file: String,
    /// Modules in declaration order.
    pub modules: Vec<Module>,
}

/// One installable unit: a named, ordered list of operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Module name (the key in the manifest's `modules` map).
    pub name: String,
    /// Whether the module runs when no explicit selection is given.
    pub enabled: bool,
    /// Free-form description shown by `--list-modules`.
    pub description: String,
    /// Operations in declared order.
    pub operations: Vec<Operation>,
}

/// A single installation step.
///
/// `source` paths are resolved against the config directory and `target`
/// paths against the install directory; absolute paths are used as-is.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Copy one file.
    CopyFile {
        /// File to copy.
        source: PathBuf,
        /// Destination path.
        target: PathBuf,
    },
    /// Copy a directory tree.
    CopyDir {
        /// Directory to copy.
        source: PathBuf,
        /// Destination directory.
        target: PathBuf,
    },
    /// Run a shell command in the install directory.
    RunCommand {
        /// Command line passed to the platform shell.
        command: String,
        /// Extra environment variables, overriding the inherited environment.
        #[serde(default)]
        env: BTreeMap<String, String>,
    },
}

impl Operation {
    /// The discriminant of this operation.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::CopyFile { .. } => OperationKind::CopyFile,
            Self::CopyDir { .. } => OperationKind::CopyDir,
            Self::RunCommand { .. } => OperationKind::RunCommand,
        }
    }
}

/// Operation discriminant, serialized as the manifest's `type` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// `copy_file`
    CopyFile,
    /// `copy_dir`
    CopyDir,
    /// `run_command`
    RunCommand,
}

impl OperationKind {
    /// Every operation kind, in manifest documentation order.
    pub const ALL: [Self; 3] = [Self::CopyFile, Self::CopyDir, Self::RunCommand];

    /// The manifest `type` string for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CopyFile => "copy_file",
            Self::CopyDir => "copy_dir",
            Self::RunCommand => "run_command",
        }
    }

    /// Look up a kind by its manifest `type` string.
    #[must_use]
    pub fn from_type(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    version: String,
    #[serde(default = "default_install_dir")]
    install_dir: String,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(deserialize_with = "ordered_modules")]
    modules: Vec<(String, RawModule)>,
}

#[derive(Debug, Deserialize)]
struct RawModule {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    description: String,
    #[serde(default)]
    operations: Vec<serde_json::Value>,
}

fn default_install_dir() -> String {
    DEFAULT_INSTALL_DIR.to_string()
}

fn default_log_file() -> String {
    DEFAULT_LOG_FILE.to_string()
}

/// Deserialize the `modules` map into a list that keeps document order.
fn ordered_modules<'de, D>(deserializer: D) -> Result<Vec<(String, RawModule)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ModulesVisitor;

    impl<'de> Visitor<'de> for ModulesVisitor {
        type Value = Vec<(String, RawModule)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of module names to module definitions")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut modules: Self::Value = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, module)) = map.next_entry::<String, RawModule>()? {
                if modules.iter().any(|(existing, _)| *existing == name) {
                    return Err(A::Error::custom(format!("duplicate module '{name}'")));
                }
                modules.push((name, module));
            }
            Ok(modules)
        }
    }

    deserializer.deserialize_map(ModulesVisitor)
}

impl Config {
    /// Read and validate the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read,
    /// [`ConfigError::Parse`] if it is not a well-formed manifest, and the
    /// operation-level errors from [`validation::parse_operation`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse and validate manifest text. `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let modules = raw
            .modules
            .into_iter()
            .map(|(name, module)| {
                let operations = module
                    .operations
                    .into_iter()
                    .enumerate()
                    .map(|(index, value)| validation::parse_operation(&name, index, value))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Module {
                    name,
                    enabled: module.enabled,
                    description: module.description,
                    operations,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            version: raw.version,
            install_dir: raw.install_dir,
            log_file: raw.log_file,
            modules,
        })
    }

    /// Look up a module by name.
    #[must_use]
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Config, ConfigError> {
        Config::parse(json, Path::new("config.json"))
    }

    #[test]
    fn modules_keep_declaration_order() {
        let config = parse(
            r#"{
                "version": "1.0",
                "modules": {
                    "zeta": {"enabled": true, "description": "z", "operations": []},
                    "alpha": {"enabled": false, "description": "a", "operations": []},
                    "mid": {"enabled": true, "description": "m", "operations": []}
                }
            }"#,
        )
        .unwrap();
        let names: Vec<&str> = config.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn defaults_apply_for_install_dir_and_log_file() {
        let config = parse(r#"{"version": "1.0", "modules": {}}"#).unwrap();
        assert_eq!(config.install_dir, DEFAULT_INSTALL_DIR);
        assert_eq!(config.log_file, DEFAULT_LOG_FILE);
        assert!(config.modules.is_empty());
    }

    #[test]
    fn parses_every_operation_kind() {
        let config = parse(
            r#"{
                "version": "1.0",
                "install_dir": "/opt/app",
                "log_file": "logs/install.log",
                "modules": {
                    "dev": {
                        "enabled": true,
                        "description": "dev module",
                        "operations": [
                            {"type": "copy_file", "source": "a.txt", "target": "b.txt"},
                            {"type": "copy_dir", "source": "src", "target": "dst"},
                            {"type": "run_command", "command": "echo hi", "env": {"MODE": "dev"}}
                        ]
                    }
                }
            }"#,
        )
        .unwrap();

        let dev = config.module("dev").unwrap();
        assert_eq!(dev.description, "dev module");
        assert_eq!(
            dev.operations[0],
            Operation::CopyFile {
                source: PathBuf::from("a.txt"),
                target: PathBuf::from("b.txt"),
            }
        );
        assert_eq!(dev.operations[1].kind(), OperationKind::CopyDir);
        let Operation::RunCommand { command, env } = &dev.operations[2] else {
            panic!("expected run_command, got {:?}", dev.operations[2]);
        };
        assert_eq!(command, "echo hi");
        assert_eq!(env.get("MODE").map(String::as_str), Some("dev"));
    }

    #[test]
    fn unknown_operation_type_is_a_config_error() {
        let err = parse(
            r#"{
                "version": "1.0",
                "modules": {
                    "dev": {"enabled": true, "description": "", "operations": [
                        {"type": "copy_file", "source": "a", "target": "b"},
                        {"type": "unknown_op", "source": "", "target": ""}
                    ]}
                }
            }"#,
        )
        .unwrap_err();
        assert!(
            matches!(
                &err,
                ConfigError::UnknownOperation { module, index: 1, kind } if module == "dev" && kind == "unknown_op"
            ),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn duplicate_module_names_are_rejected() {
        let err = parse(
            r#"{"version": "1.0", "modules": {
                "dev": {"enabled": true, "operations": []},
                "dev": {"enabled": false, "operations": []}
            }}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate module 'dev'"), "{err}");
    }

    #[test]
    fn broken_json_is_a_parse_error() {
        let err = parse("{broken").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_modules_key_is_a_parse_error() {
        let err = parse(r#"{"version": "1.0"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn operation_kind_round_trips_type_strings() {
        for kind in OperationKind::ALL {
            assert_eq!(OperationKind::from_type(kind.as_str()), Some(kind));
        }
        assert_eq!(OperationKind::from_type("unknown_op"), None);
    }
}
