//! Error types for DOCX operations

use thiserror::Error;

/// Errors that can occur while reading, patching or writing a report package
#[derive(Debug, Error)]
pub enum DocxError {
    /// IO error (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error while writing
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Bytes are not a readable DOCX package
    #[error("Corrupt package: {0}")]
    CorruptPackage(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Template bytes could not be retrieved
    #[error("Template fetch failed for {location}{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    SourceFetch {
        location: String,
        status: Option<u16>,
        message: String,
    },

    /// Template data building or rendering failed
    #[error(transparent)]
    Merge(#[from] report_merge::MergeError),

    /// Sketch image could not be decoded
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Export settings could not be written
    #[error("Settings error: {0}")]
    Settings(String),

    /// UTF-8 encoding error
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl From<quick_xml::Error> for DocxError {
    fn from(err: quick_xml::Error) -> Self {
        DocxError::XmlParse(err.to_string())
    }
}

impl From<serde_json::Error> for DocxError {
    fn from(err: serde_json::Error) -> Self {
        DocxError::Settings(err.to_string())
    }
}

/// Result type for DOCX operations
pub type DocxResult<T> = std::result::Result<T, DocxError>;
