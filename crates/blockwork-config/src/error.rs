//! Configuration error types.

use std::io;
use thiserror::Error;

/// Errors from loading blockwork configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("cannot read config {path}: {source}")]
    ReadError {
        /// Config file path.
        path: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A config layer is not valid TOML or does not match the schema.
    #[error("invalid config {path}: {source}")]
    ParseError {
        /// Config file path, or a `<...>` label for merged layers.
        path: String,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },

    /// A merged value is out of range.
    #[error("config field '{field}': {message}")]
    ValidationError {
        /// Dotted field path.
        field: String,
        /// What was wrong.
        message: String,
    },

    /// A `BLOCKWORK_*` variable has a value of the wrong type.
    #[error("environment variable {var_name}: {message}")]
    EnvError {
        /// Variable name.
        var_name: String,
        /// What was wrong.
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
