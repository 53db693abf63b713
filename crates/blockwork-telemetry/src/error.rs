use thiserror::Error;

/// Errors from logging setup.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Level, format, or directive could not be parsed.
    #[error("invalid logging configuration: {0}")]
    ConfigError(String),

    /// A global subscriber was already installed.
    #[error("logging already initialized: {0}")]
    InitError(String),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
