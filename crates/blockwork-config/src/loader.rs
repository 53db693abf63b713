//! Layered config loading.
//!
//! Layers, lowest precedence first:
//! 1. embedded `defaults.toml`
//! 2. user config (`<config dir>/blockwork/config.toml`)
//! 3. workspace config (`<working dir>/blockwork.toml`)
//! 4. `BLOCKWORK_*` env vars, for fields neither file set

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{FieldSources, deep_merge};
use crate::types::Config;
use crate::validate;

const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Workspace config file name.
pub const WORKSPACE_CONFIG_FILE: &str = "blockwork.toml";

const MAX_CONFIG_FILE_SIZE: usize = 1_048_576;

/// A loaded config plus where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The merged, validated config.
    pub config: Config,
    /// Fields set by a file or env var rather than the defaults.
    pub field_sources: FieldSources,
    /// Config files that were found and merged, in order.
    pub loaded_files: Vec<PathBuf>,
}

/// The embedded defaults as a [`Config`].
///
/// # Errors
///
/// Returns [`ConfigError::ParseError`] if the embedded defaults do not
/// deserialize.
pub fn defaults() -> ConfigResult<Config> {
    toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
        path: "<embedded defaults>".to_owned(),
        source: e,
    })
}

/// Load config for `working_dir` from files and the process environment.
///
/// `user_config_override` replaces the user config path.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file is unreadable or malformed, an env
/// var has the wrong type, or the merged config fails validation.
pub fn load(working_dir: &Path, user_config_override: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    load_with_env(working_dir, user_config_override, &collect_env_vars())
}

/// [`load`] with an explicit environment.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env<S: BuildHasher>(
    working_dir: &Path,
    user_config_override: Option<&Path>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<ResolvedConfig> {
    let mut merged: toml::Value = toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
        path: "<embedded defaults>".to_owned(),
        source: e,
    })?;
    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();

    let user_path = user_config_override.map(Path::to_path_buf).or_else(user_config_path);
    let workspace_path = working_dir.join(WORKSPACE_CONFIG_FILE);

    for path in user_path.into_iter().chain(std::iter::once(workspace_path)) {
        if let Some(overlay) = try_load_file(&path)? {
            deep_merge(&mut merged, &overlay, "", &mut field_sources);
            info!(path = %path.display(), "loaded config");
            loaded_files.push(path);
        }
    }

    let applied = apply_env_fallbacks(&mut merged, &mut field_sources, env_vars)?;
    if applied > 0 {
        debug!(count = applied, "applied environment variable fallbacks");
    }

    let config: Config = merged
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: "<merged config>".to_owned(),
            source: e,
        })?;
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Default user config path, if the platform has a config directory.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.config_dir().join("blockwork").join("config.toml"))
}

fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!("config file is {} bytes, limit is {MAX_CONFIG_FILE_SIZE}", content.len()),
        });
    }

    toml::from_str(&content)
        .map(Some)
        .map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })
}
