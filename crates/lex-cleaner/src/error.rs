//! Custom error types for the cleaning pipeline.
//!
//! Each stage has its own error enum so callers can tell a file that could not
//! be read ([`LoadError`]) from a file that is not tabular ([`PipelineError`])
//! from an artifact that could not be written ([`PersistenceError`]).
//! [`CleaningError`] wraps all of them for the orchestration layer.
//!
//! Errors are serializable as `{code, message}` so they can be handed to a
//! frontend or emitted in JSON mode unchanged.

use crate::config::ConfigValidationError;
use crate::table::TableError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The input bytes could not be turned into a table.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Zero-byte input.
    #[error("Input is empty")]
    EmptyInput,

    /// The file extension maps to no supported format.
    #[error("Unsupported file format '{0}'")]
    UnsupportedFormat(String),

    /// No configured encoding could decode the input.
    #[error("Unable to read delimited input with supported encodings: {}", .tried.join(", "))]
    UnsupportedEncoding { tried: Vec<String> },

    /// The input decoded but is not well-formed delimited text.
    #[error("Malformed delimited input: {0}")]
    Malformed(#[from] TableError),

    /// The CSV reader rejected the decoded text.
    #[error("Failed to parse delimited input: {0}")]
    Delimited(#[from] csv::Error),

    /// The workbook could not be opened or read.
    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    /// The workbook has no worksheet to read.
    #[error("Workbook contains no worksheet")]
    NoWorksheet,

    /// The source file could not be read.
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The loaded table is structurally unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Nothing is left once all-missing columns are dropped.
    #[error("Input has no usable columns")]
    NoColumns,
}

/// The cleaned table could not be written.
///
/// Metrics and the in-memory table are unaffected by this error.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The output path could not be derived from the hint.
    #[error("Cannot derive an output file name from '{}'", .0.display())]
    InvalidTarget(PathBuf),

    /// Creating the directory or file failed.
    #[error("Failed to write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV writer failed.
    #[error("Failed to write delimited output: {0}")]
    Delimited(#[from] csv::Error),

    /// The workbook writer failed.
    #[error("Failed to write spreadsheet: {0}")]
    Spreadsheet(String),
}

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// Report generation failed.
    #[error("Failed to generate report: {0}")]
    ReportGenerationFailed(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Load(LoadError::EmptyInput) => "EMPTY_INPUT",
            Self::Load(LoadError::UnsupportedFormat(_)) => "UNSUPPORTED_FORMAT",
            Self::Load(LoadError::UnsupportedEncoding { .. }) => "UNSUPPORTED_ENCODING",
            Self::Load(_) => "LOAD_FAILED",
            Self::Pipeline(PipelineError::NoColumns) => "NO_COLUMNS",
            Self::Persistence(_) => "PERSISTENCE_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Persistence failures leave the cleaned data intact; everything else
    /// means there is nothing to report on.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Persistence(_) | Self::ReportGenerationFailed(_) => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

/// Serialize implementation for frontend/JSON consumers.
///
/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<CleaningError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            CleaningError::from(LoadError::EmptyInput).error_code(),
            "EMPTY_INPUT"
        );
        assert_eq!(
            CleaningError::from(PipelineError::NoColumns).error_code(),
            "NO_COLUMNS"
        );
        assert_eq!(
            CleaningError::from(LoadError::NoWorksheet).error_code(),
            "LOAD_FAILED"
        );
    }

    #[test]
    fn test_unsupported_encoding_message_lists_candidates() {
        let error = LoadError::UnsupportedEncoding {
            tried: vec!["utf-8".to_string(), "latin1".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Unable to read delimited input with supported encodings: utf-8, latin1"
        );
    }

    #[test]
    fn test_is_recoverable() {
        let persistence = CleaningError::from(PersistenceError::InvalidTarget(PathBuf::from("..")));
        assert!(persistence.is_recoverable());
        assert!(!CleaningError::from(PipelineError::NoColumns).is_recoverable());
        assert!(!CleaningError::from(LoadError::EmptyInput).is_recoverable());
    }

    #[test]
    fn test_error_serialization() {
        let error = CleaningError::from(PipelineError::NoColumns);
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("NO_COLUMNS"));
        assert!(json.contains("no usable columns"));
    }

    #[test]
    fn test_with_context() {
        let error: Result<()> = Err(LoadError::EmptyInput).context("While loading 'data.csv'");
        let error = error.unwrap_err();
        assert!(error.to_string().contains("While loading 'data.csv'"));
        assert_eq!(error.error_code(), "EMPTY_INPUT"); // Preserves original code
    }
}
