//! Error types for trust-calibration

use thiserror::Error;

/// Errors that can occur while loading, deriving or comparing study data
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A corner that carries a response or latency has no reference-table entry
    #[error("Configuration error: no reference-table entry for corner {corner}")]
    ConfigurationError { corner: u8 },

    #[error("Invalid maze layout: {0}")]
    InvalidLayout(String),

    #[error("Unknown condition label: {0}")]
    UnknownCondition(String),

    #[error("Duplicate participant id: {0}")]
    DuplicateParticipant(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Insufficient data for computation: {0}")]
    InsufficientData(String),

    #[error("Unknown factor: {0}")]
    UnknownFactor(String),

    #[error("Invalid study configuration: {0}")]
    InvalidConfig(String),
}
