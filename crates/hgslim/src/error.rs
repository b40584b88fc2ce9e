//! Error types for the hgslim library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for hgslim operations.
#[derive(Debug, Error)]
pub enum HgError {
    /// Error reading or writing a named file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error reading the input stream or writing the output sink.
    #[error("Stream error: {0}")]
    Stream(#[from] std::io::Error),

    /// The input is not well-formed XML.
    #[error("XML error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    /// The input ended while elements were still open.
    #[error("Truncated input: {depth} element(s) still open at end of stream")]
    TruncatedInput { depth: usize },

    /// An expected field is absent and the strict policy is active.
    #[error("Missing field '{field}' in record '{record}'")]
    MissingField { record: String, field: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the CSV library while reading a taxon list.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The consumer stopped before the document was complete.
    #[error("Interrupted before the output document was complete")]
    Interrupted,
}

impl HgError {
    /// Wrap an IO error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HgError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for hgslim operations.
pub type Result<T> = std::result::Result<T, HgError>;
