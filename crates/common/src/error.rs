//! Common error types for obsreport components.

use thiserror::Error;

/// Common errors that can occur when building component identity and
/// telemetry settings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// Component identifier could not be parsed
    #[error("Invalid component id: {0}")]
    InvalidComponentId(String),

    /// Unknown data type name
    #[error("Unknown data type: {0}")]
    UnknownDataType(String),

    /// Unknown telemetry level name
    #[error("Unknown telemetry level: {0}")]
    UnknownTelemetryLevel(String),
}

/// Result type alias using `CommonError`
pub type Result<T> = std::result::Result<T, CommonError>;
