//! Checks on merged configuration values.

use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json"];

/// Check value ranges that serde cannot express.
///
/// # Errors
///
/// Returns [`ConfigError::ValidationError`] naming the first offending field.
pub fn validate(config: &Config) -> ConfigResult<()> {
    let folder = config.blocks.folder.trim();
    if folder.is_empty() {
        return Err(invalid("blocks.folder", "must not be empty"));
    }
    if Path::new(folder).is_absolute() {
        return Err(invalid("blocks.folder", "must be relative to the working directory"));
    }
    if config.blocks.install_command.iter().all(|part| part.trim().is_empty()) {
        return Err(invalid("blocks.install_command", "must name a program"));
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(invalid(
            "logging.level",
            &format!("'{}' is not one of {}", config.logging.level, LOG_LEVELS.join(", ")),
        ));
    }
    let format = config.logging.format.to_ascii_lowercase();
    if !LOG_FORMATS.contains(&format.as_str()) {
        return Err(invalid(
            "logging.format",
            &format!("'{}' is not one of {}", config.logging.format, LOG_FORMATS.join(", ")),
        ));
    }
    Ok(())
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.to_owned(),
    }
}
