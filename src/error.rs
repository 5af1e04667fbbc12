//! Error types for phonorate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhonorateError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to render configuration: {message}")]
    ConfigRender { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Phonemization errors
    #[error("Phonemizer binary not found: {binary}")]
    PhonemizerNotFound { binary: String },

    #[error("Phonemization failed for language '{language}': {message}")]
    Phonemization { language: String, message: String },

    #[error("{command} failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("{binary} did not finish within {timeout_ms} ms")]
    PhonemizerTimeout { binary: String, timeout_ms: u64 },

    // Record errors
    #[error("Missing field '{field}': {message}")]
    MissingField { field: String, message: String },

    #[error("Degenerate duration: {message}")]
    DegenerateDuration { message: String },

    #[error("Record {index} failed: {source}")]
    RecordFailed {
        index: usize,
        #[source]
        source: Box<PhonorateError>,
    },

    #[error("Column '{column}' has {actual} values, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    // Dataset errors
    #[error("Failed to parse {path} line {line}: {message}")]
    DatasetParse {
        path: String,
        line: usize,
        message: String,
    },

    #[error("Failed to decode audio: {message}")]
    AudioDecode { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl PhonorateError {
    pub(crate) fn phonemization(language: &str, message: impl Into<String>) -> Self {
        Self::Phonemization {
            language: language.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn missing_field(field: &str, message: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateDuration {
            message: message.into(),
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, PhonorateError>;
