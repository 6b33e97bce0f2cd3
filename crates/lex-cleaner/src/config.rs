//! Configuration types for the cleaning pipeline.
//!
//! The cleaning steps and their order are fixed. What is configurable is how
//! input is read (encodings, delimiter, missing markers) and where the cleaned
//! artifact goes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Encodings tried, in order, when reading delimited input.
pub const DEFAULT_ENCODINGS: [&str; 4] = ["utf-8", "utf-16", "latin1", "cp1252"];

/// Trimmed field values read as missing.
pub const DEFAULT_MISSING_MARKERS: [&str; 11] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Default directory for cleaned artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "processed";

/// Default file name prefix for cleaned artifacts.
pub const DEFAULT_OUTPUT_PREFIX: &str = "pro";

/// Configuration for loading and persisting tables.
///
/// Use [`CleanerConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use lex_cleaner::config::CleanerConfig;
///
/// let config = CleanerConfig::builder()
///     .encoding_candidates(["utf-8", "latin1"])
///     .output_dir("out")
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Ordered encoding labels tried for delimited input.
    /// Labels follow the WHATWG Encoding Standard (`utf-8`, `latin1`, ...).
    /// Default: utf-8, utf-16, latin1, cp1252
    pub encoding_candidates: Vec<String>,

    /// Field values (after trimming) treated as missing.
    /// Default: empty string plus the usual NA spellings
    pub missing_markers: Vec<String>,

    /// Field delimiter for delimited input and output.
    /// Default: b','
    pub delimiter: u8,

    /// Directory the cleaned file is written to.
    /// Default: "processed"
    pub output_dir: PathBuf,

    /// Prefix for the cleaned file name (`<prefix>_<original name>`).
    /// Default: "pro"
    pub output_prefix: String,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            encoding_candidates: DEFAULT_ENCODINGS.iter().map(|s| s.to_string()).collect(),
            missing_markers: DEFAULT_MISSING_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            delimiter: b',',
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
        }
    }
}

impl CleanerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleanerConfigBuilder {
        CleanerConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.encoding_candidates.is_empty() {
            return Err(ConfigValidationError::NoEncodings);
        }

        if let Some(label) = self
            .encoding_candidates
            .iter()
            .find(|label| encoding_rs::Encoding::for_label(label.trim().as_bytes()).is_none())
        {
            return Err(ConfigValidationError::UnknownEncoding(label.clone()));
        }

        if !self.delimiter.is_ascii() || matches!(self.delimiter, b'\n' | b'\r' | b'"') {
            return Err(ConfigValidationError::InvalidDelimiter(self.delimiter as char));
        }

        if self.output_prefix.is_empty()
            || self.output_prefix.contains(['/', '\\'])
        {
            return Err(ConfigValidationError::InvalidPrefix(
                self.output_prefix.clone(),
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("At least one encoding candidate is required")]
    NoEncodings,

    #[error("Unknown encoding label '{0}'")]
    UnknownEncoding(String),

    #[error("Invalid delimiter {0:?}")]
    InvalidDelimiter(char),

    #[error("Invalid output prefix '{0}' (must be non-empty and contain no path separators)")]
    InvalidPrefix(String),
}

/// Builder for [`CleanerConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleanerConfigBuilder {
    encoding_candidates: Option<Vec<String>>,
    missing_markers: Option<Vec<String>>,
    delimiter: Option<u8>,
    output_dir: Option<PathBuf>,
    output_prefix: Option<String>,
}

impl CleanerConfigBuilder {
    /// Set the ordered list of encodings tried for delimited input.
    pub fn encoding_candidates<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.encoding_candidates = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the set of values read as missing.
    pub fn missing_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_markers = Some(markers.into_iter().map(Into::into).collect());
        self
    }

    /// Set the field delimiter.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set the output directory for cleaned files.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the cleaned file name prefix.
    pub fn output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = Some(prefix.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleanerConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleanerConfig, ConfigValidationError> {
        let defaults = CleanerConfig::default();
        let config = CleanerConfig {
            encoding_candidates: self
                .encoding_candidates
                .unwrap_or(defaults.encoding_candidates),
            missing_markers: self.missing_markers.unwrap_or(defaults.missing_markers),
            delimiter: self.delimiter.unwrap_or(defaults.delimiter),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            output_prefix: self.output_prefix.unwrap_or(defaults.output_prefix),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CleanerConfig::default();
        assert_eq!(
            config.encoding_candidates,
            vec!["utf-8", "utf-16", "latin1", "cp1252"]
        );
        assert_eq!(config.delimiter, b',');
        assert_eq!(config.output_dir, PathBuf::from("processed"));
        assert_eq!(config.output_prefix, "pro");
        assert!(config.missing_markers.contains(&String::new()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = CleanerConfig::builder()
            .encoding_candidates(["latin1"])
            .missing_markers(["", "-"])
            .delimiter(b';')
            .output_dir("out")
            .output_prefix("clean")
            .build()
            .unwrap();

        assert_eq!(config.encoding_candidates, vec!["latin1"]);
        assert_eq!(config.missing_markers, vec!["", "-"]);
        assert_eq!(config.delimiter, b';');
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.output_prefix, "clean");
    }

    #[test]
    fn test_validation_empty_encodings() {
        let result = CleanerConfig::builder()
            .encoding_candidates(Vec::<String>::new())
            .build();
        assert_eq!(result.unwrap_err(), ConfigValidationError::NoEncodings);
    }

    #[test]
    fn test_validation_unknown_encoding() {
        let result = CleanerConfig::builder()
            .encoding_candidates(["utf-8", "klingon"])
            .build();
        assert_eq!(
            result.unwrap_err(),
            ConfigValidationError::UnknownEncoding("klingon".to_string())
        );
    }

    #[test]
    fn test_validation_invalid_prefix() {
        let result = CleanerConfig::builder().output_prefix("a/b").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidPrefix(_)
        ));
    }

    #[test]
    fn test_validation_invalid_delimiter() {
        let result = CleanerConfig::builder().delimiter(b'\n').build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidDelimiter('\n')
        ));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "encoding_candidates": ["utf-8", "cp1252"],
            "missing_markers": ["", "?"],
            "delimiter": 59,
            "output_dir": "custom_output",
            "output_prefix": "clean"
        }"#;

        let config: CleanerConfig =
            serde_json::from_str(json).expect("Should deserialize from JSON");

        assert_eq!(config.encoding_candidates, vec!["utf-8", "cp1252"]);
        assert_eq!(config.delimiter, b';');
        assert_eq!(config.output_dir.to_str().unwrap(), "custom_output");
        assert!(config.validate().is_ok());
    }
}
