//! Environment variable fallbacks.
//!
//! `BLOCKWORK_*` variables only fill fields that no config file set.

use std::collections::HashMap;
use std::hash::BuildHasher;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::FieldSources;

#[derive(Clone, Copy)]
enum EnvKind {
    Str,
    Bool,
}

struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    kind: EnvKind,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "BLOCKWORK_BLOCKS_FOLDER",
        field_path: "blocks.folder",
        kind: EnvKind::Str,
    },
    EnvMapping {
        var_name: "BLOCKWORK_ALLOW_INSTALLS",
        field_path: "blocks.allow_installs",
        kind: EnvKind::Bool,
    },
    EnvMapping {
        var_name: "BLOCKWORK_VERIFY_BLOCKS",
        field_path: "blocks.verify_blocks",
        kind: EnvKind::Bool,
    },
    EnvMapping {
        var_name: "BLOCKWORK_ALLOW_IMPORT_FAILURE",
        field_path: "blocks.allow_import_failure",
        kind: EnvKind::Bool,
    },
    EnvMapping {
        var_name: "BLOCKWORK_LOG_LEVEL",
        field_path: "logging.level",
        kind: EnvKind::Str,
    },
    EnvMapping {
        var_name: "BLOCKWORK_LOG_FORMAT",
        field_path: "logging.format",
        kind: EnvKind::Str,
    },
];

/// Apply env var fallbacks to fields not set by any config file.
///
/// Returns the number of variables applied.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] if a boolean variable is not
/// `true`/`false`/`1`/`0`.
pub fn apply_env_fallbacks<S: BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let mut count: usize = 0;
    for mapping in ENV_MAPPINGS {
        if sources.contains(mapping.field_path) {
            continue;
        }
        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };
        let value = coerce(mapping, raw)?;
        debug!(var = mapping.var_name, field = mapping.field_path, "applying env var fallback");
        set_field(merged, mapping.field_path, value);
        sources.insert(mapping.field_path.to_owned());
        count = count.saturating_add(1);
    }
    Ok(count)
}

fn coerce(mapping: &EnvMapping, raw: &str) -> ConfigResult<toml::Value> {
    match mapping.kind {
        EnvKind::Str => Ok(toml::Value::String(raw.to_owned())),
        EnvKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(toml::Value::Boolean(true)),
            "false" | "0" | "no" => Ok(toml::Value::Boolean(false)),
            other => Err(ConfigError::EnvError {
                var_name: mapping.var_name.to_owned(),
                message: format!("expected a boolean, got '{other}'"),
            }),
        },
    }
}

fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return;
    };
    let mut current = root;
    for segment in segments {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        current = table
            .entry(segment)
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    }
    if let Some(table) = current.as_table_mut() {
        table.insert(leaf.to_owned(), value);
    }
}

/// Snapshot the process environment.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}
