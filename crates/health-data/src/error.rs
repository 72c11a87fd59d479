//! Error types for the dataset engine.
//!
//! Every failure the engine can report is a data-shape problem (empty upload,
//! unknown dataset, bad configuration) or a wrapped collaborator failure
//! (polars while reading/writing CSV, the AI provider, JSON).
//!
//! Errors are serializable so request handlers can forward them to the
//! frontend as `{ "code": ..., "message": ... }`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::config::ConfigValidationError;

/// The main error type for the dataset engine.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Parsing produced zero rows.
    #[error("Parsed dataset is empty or invalid")]
    EmptyDataset,

    /// No dataset is stored under the given identifier.
    #[error("Dataset '{0}' not found")]
    DatasetNotFound(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A data line did not match the header's field count (strict parsing only).
    #[error("Line {line} has {found} field(s), expected {expected}")]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// The AI collaborator failed to produce a completion.
    #[error("AI client error: {0}")]
    AiClientError(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper (CSV reading and export).
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error (for the AI client, only with "ai" feature).
    #[cfg(feature = "ai")]
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<DatasetError>,
    },
}

impl DatasetError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        DatasetError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::DatasetNotFound(_) => "DATASET_NOT_FOUND",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::MalformedRow { .. } => "MALFORMED_ROW",
            Self::AiClientError(_) => "AI_CLIENT_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            #[cfg(feature = "ai")]
            Self::HttpRequest(_) => "HTTP_REQUEST_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the caller can fix the problem by changing its input and retrying.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::EmptyDataset
            | Self::DatasetNotFound(_)
            | Self::ColumnNotFound(_)
            | Self::InvalidConfig(_)
            | Self::MalformedRow { .. } => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

impl From<ConfigValidationError> for DatasetError {
    fn from(err: ConfigValidationError) -> Self {
        DatasetError::InvalidConfig(err.to_string())
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for DatasetError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("DatasetError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| DatasetError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(DatasetError::EmptyDataset.error_code(), "EMPTY_DATASET");
        assert_eq!(
            DatasetError::DatasetNotFound("abc".to_string()).error_code(),
            "DATASET_NOT_FOUND"
        );
    }

    #[test]
    fn test_is_recoverable() {
        assert!(DatasetError::EmptyDataset.is_recoverable());
        assert!(DatasetError::InvalidConfig("bad".to_string()).is_recoverable());
        assert!(!DatasetError::AiClientError("timeout".to_string()).is_recoverable());
    }

    #[test]
    fn test_error_serialization() {
        let error = DatasetError::ColumnNotFound("Age".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_with_context() {
        let error = DatasetError::EmptyDataset.with_context("Uploading vitals.csv");
        assert!(error.to_string().contains("Uploading vitals.csv"));
        assert_eq!(error.error_code(), "EMPTY_DATASET");
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_config_error_converts_to_invalid_config() {
        let error: DatasetError = ConfigValidationError::UnknownStrategy("avg".to_string()).into();
        assert_eq!(error.error_code(), "INVALID_CONFIG");
        assert!(error.to_string().contains("avg"));
    }
}
