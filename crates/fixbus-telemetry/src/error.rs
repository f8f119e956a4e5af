//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Invalid level or directive.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A global subscriber is already installed, or the layer stack failed.
    #[error("Initialization error: {0}")]
    InitError(String),

    /// Log directory could not be created.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
