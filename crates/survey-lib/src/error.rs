//! Error types for the survey library
//!
//! Each stage of a submission has its own error type so callers can tell a
//! bad answer apart from a broken model.

use thiserror::Error;

/// A survey answer that cannot be mapped onto the model's input encoding
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field}: unmapped answer {value:?}, expected one of: {allowed}")]
    UnmappedLabel {
        field: &'static str,
        value: String,
        allowed: String,
    },

    #[error("{field}: value {value} is outside the allowed range {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("{field}: value must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field}: value {value} must be a whole number")]
    NotInteger { field: &'static str, value: f32 },
}

impl ValidationError {
    /// Name of the survey field that failed validation
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::UnmappedLabel { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::NotFinite { field }
            | ValidationError::NotInteger { field, .. } => field,
        }
    }
}

/// Failures while making the classifier artifact available
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no model at {path} and no download location configured")]
    NotAvailable { path: String },

    #[error("failed to fetch model from {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("model file I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    Checksum {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("failed to load model from {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("model does not match the survey feature schema: {0}")]
    SchemaMismatch(String),

    #[error("unsupported model format for {path}, expected .onnx or .json")]
    UnsupportedFormat { path: String },
}

/// Failures while running the classifier on an encoded vector
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("model execution failed: {0}")]
    Execution(String),

    #[error("model returned an invalid probability distribution: {0}")]
    InvalidOutput(String),
}

/// Error for a full encode-and-predict submission
#[derive(Debug, Error)]
pub enum SurveyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}
