//! Operation validation.
//!
//! Turns one raw JSON operation into a typed [`Operation`]. An unrecognized
//! `type` is reported separately from a known type with bad fields so the
//! caller can tell a manifest written for a newer installer from a typo.
use serde_json::Value;

use super::paths::expand_home;
use super::{Operation, OperationKind};
use crate::error::ConfigError;

/// Validate and convert the operation at `index` of `module`.
///
/// `~` prefixes in `source` and `target` are expanded here so later stages
/// only deal with plain relative or absolute paths.
///
/// # Errors
///
/// - [`ConfigError::UnknownOperation`] when `type` is not a known operation.
/// - [`ConfigError::InvalidOperation`] when `type` is missing, a required
///   field is missing or empty, or a field has the wrong JSON type.
/// - [`ConfigError::NoHomeDir`] when a `~` path cannot be expanded.
pub fn parse_operation(module: &str, index: usize, value: Value) -> Result<Operation, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidOperation {
        module: module.to_string(),
        index,
        message,
    };

    let Some(kind) = value.get("type").and_then(Value::as_str) else {
        return Err(invalid("missing string field 'type'".to_string()));
    };
    if OperationKind::from_type(kind).is_none() {
        return Err(ConfigError::UnknownOperation {
            module: module.to_string(),
            index,
            kind: kind.to_string(),
        });
    }

    let operation: Operation =
        serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;

    match operation {
        Operation::CopyFile { source, target } => {
            check_path("source", &source).map_err(&invalid)?;
            check_path("target", &target).map_err(&invalid)?;
            Ok(Operation::CopyFile {
                source: expand_home(&source)?,
                target: expand_home(&target)?,
            })
        }
        Operation::CopyDir { source, target } => {
            check_path("source", &source).map_err(&invalid)?;
            check_path("target", &target).map_err(&invalid)?;
            Ok(Operation::CopyDir {
                source: expand_home(&source)?,
                target: expand_home(&target)?,
            })
        }
        Operation::RunCommand { command, env } => {
            if command.trim().is_empty() {
                return Err(invalid("'command' must not be empty".to_string()));
            }
            Ok(Operation::RunCommand { command, env })
        }
    }
}

fn check_path(field: &str, path: &std::path::Path) -> Result<(), String> {
    if path.as_os_str().is_empty() {
        Err(format!("'{field}' must not be empty"))
    } else {
        Ok(())
    }
}
