//! Error types for consultation triage.

use thiserror::Error;

/// Result type alias for consultation triage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for consultation triage.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    // Intake errors (20-29)
    #[error("intake validation failed: {0}")]
    Intake(String),

    #[error("intake submission failed: {0}")]
    Submission(String),

    // Store errors (30-39)
    #[error("request store error: {0}")]
    Store(String),

    #[error("request {id} not found")]
    RequestNotFound { id: String },

    #[error("confirmation text does not match, expected \"{expected}\"")]
    ConfirmationMismatch { expected: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidPolicy(_) => 11,
            Error::Intake(_) => 20,
            Error::Submission(_) => 21,
            Error::Store(_) => 30,
            Error::RequestNotFound { .. } => 31,
            Error::ConfirmationMismatch { .. } => 32,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }
}
