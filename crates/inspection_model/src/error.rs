//! Error types for inspection form data

use thiserror::Error;

/// Errors that can occur while loading form data
#[derive(Debug, Error)]
pub enum ModelError {
    /// IO error reading form data from disk
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input is not valid JSON
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Form data root must be a JSON object
    #[error("Invalid form data: {0}")]
    InvalidRoot(String),
}

/// Result type for form data operations
pub type Result<T> = std::result::Result<T, ModelError>;
