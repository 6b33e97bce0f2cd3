//! Persisting the cleaned table and packaging the result.

mod delimited;
mod xlsx;

use crate::config::{CleanerConfig, DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_PREFIX};
use crate::error::PersistenceError;
use crate::loader::FormatHint;
use crate::table::{SAMPLE_SIZE, SampleRow, Table};
use crate::types::{CleaningMetrics, ColumnClassification};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where and how to write the cleaned table.
///
/// The artifact is written to `<dir>/<prefix>_<file name>` in the same format
/// as the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputHint {
    /// Name of the source file. Only its final component is used.
    pub file_name: String,
    pub format: FormatHint,
    pub delimiter: u8,
    pub dir: PathBuf,
    pub prefix: String,
}

impl OutputHint {
    /// Hint with the default directory, prefix and a comma delimiter.
    pub fn new(file_name: impl Into<String>, format: FormatHint) -> Self {
        Self {
            file_name: file_name.into(),
            format,
            delimiter: if format == FormatHint::TabDelimited {
                b'\t'
            } else {
                b','
            },
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
        }
    }

    /// Hint taking directory, prefix and delimiter from `config`.
    pub fn from_config(file_name: impl Into<String>, format: FormatHint, config: &CleanerConfig) -> Self {
        Self {
            file_name: file_name.into(),
            format,
            delimiter: format.delimiter(config),
            dir: config.output_dir.clone(),
            prefix: config.output_prefix.clone(),
        }
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Full path of the artifact.
    pub fn target_path(&self) -> Result<PathBuf, PersistenceError> {
        let base = Path::new(&self.file_name)
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| PersistenceError::InvalidTarget(PathBuf::from(&self.file_name)))?;
        Ok(self.dir.join(format!("{}_{}", self.prefix, base)))
    }
}

/// Everything a caller needs after one cleaning run.
///
/// Built once by [`assemble_result`] and never changed afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRecord {
    #[serde(skip)]
    table: Table,
    #[serde(flatten)]
    metrics: CleaningMetrics,
    classification: ColumnClassification,
    columns: Vec<String>,
    sample: Vec<SampleRow>,
    cleaned_file_path: PathBuf,
}

static_assertions::assert_impl_all!(ResultRecord: Send, Sync);

impl ResultRecord {
    /// The cleaned table.
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn metrics(&self) -> &CleaningMetrics {
        &self.metrics
    }

    pub fn classification(&self) -> &ColumnClassification {
        &self.classification
    }

    /// Column names of the cleaned table, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// First rows of the cleaned table as name→value maps.
    pub fn sample(&self) -> &[SampleRow] {
        &self.sample
    }

    pub fn cleaned_file_path(&self) -> &Path {
        &self.cleaned_file_path
    }
}

/// Persist `table` and package it with its metrics.
///
/// Inputs are borrowed, so a caller still holds the cleaned data when this
/// fails.
///
/// # Errors
///
/// Returns [`PersistenceError`] if the output path cannot be derived or the
/// file cannot be written.
pub fn assemble_result(
    table: &Table,
    metrics: &CleaningMetrics,
    classification: &ColumnClassification,
    hint: &OutputHint,
) -> Result<ResultRecord, PersistenceError> {
    let path = hint.target_path()?;
    fs::create_dir_all(&hint.dir).map_err(|source| PersistenceError::Io {
        path: hint.dir.clone(),
        source,
    })?;

    match hint.format {
        FormatHint::Spreadsheet => xlsx::write(table, &path)?,
        FormatHint::Delimited | FormatHint::TabDelimited => {
            delimited::write(table, &path, hint.delimiter)?
        }
    }
    info!("Cleaned data saved: {}", path.display());

    Ok(ResultRecord {
        table: table.clone(),
        metrics: metrics.clone(),
        classification: classification.clone(),
        columns: table.column_names(),
        sample: table.sample(SAMPLE_SIZE),
        cleaned_file_path: path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn cleaned() -> Table {
        Table::from_rows(
            ["name", "age"],
            (0..7)
                .map(|i| vec![Cell::from(format!("p{i}")), Cell::from(20 + i as i64)])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_target_path() {
        let hint = OutputHint::new("uploads/data.csv", FormatHint::Delimited);
        assert_eq!(
            hint.target_path().unwrap(),
            PathBuf::from("processed").join("pro_data.csv")
        );

        let hint = OutputHint::new("data.csv", FormatHint::Delimited)
            .with_dir("out")
            .with_prefix("clean");
        assert_eq!(hint.target_path().unwrap(), PathBuf::from("out").join("clean_data.csv"));
    }

    #[test]
    fn test_target_path_rejects_directories() {
        let hint = OutputHint::new("..", FormatHint::Delimited);
        assert!(matches!(
            hint.target_path(),
            Err(PersistenceError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_assemble_writes_and_samples() {
        let dir = TempDir::new().unwrap();
        let table = cleaned();
        let hint = OutputHint::new("people.csv", FormatHint::Delimited).with_dir(dir.path());

        let record = assemble_result(
            &table,
            &CleaningMetrics::default(),
            &ColumnClassification::default(),
            &hint,
        )
        .unwrap();

        assert_eq!(record.cleaned_file_path(), dir.path().join("pro_people.csv"));
        assert_eq!(record.columns(), ["name", "age"]);
        assert_eq!(record.sample().len(), SAMPLE_SIZE);
        assert_eq!(record.sample()[0]["name"], serde_json::json!("p0"));
        assert_eq!(record.table(), &table);

        let written = fs::read_to_string(record.cleaned_file_path()).unwrap();
        assert!(written.starts_with("name,age\np0,20\n"));
    }

    #[test]
    fn test_record_serialization_skips_table() {
        let dir = TempDir::new().unwrap();
        let hint = OutputHint::new("people.csv", FormatHint::Delimited).with_dir(dir.path());
        let metrics = CleaningMetrics {
            removed_duplicates: 3,
            ..Default::default()
        };
        let record = assemble_result(&cleaned(), &metrics, &ColumnClassification::default(), &hint)
            .unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["removed_duplicates"], serde_json::json!(3));
        assert!(json.get("table").is_none());
        assert!(json["cleaned_file_path"].as_str().unwrap().ends_with("pro_people.csv"));
    }

    #[test]
    fn test_unwritable_target_is_persistence_error() {
        let dir = TempDir::new().unwrap();
        // a file where the output directory should be
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, b"x").unwrap();
        let hint = OutputHint::new("people.csv", FormatHint::Delimited).with_dir(&blocker);

        let table = cleaned();
        let result = assemble_result(
            &table,
            &CleaningMetrics::default(),
            &ColumnClassification::default(),
            &hint,
        );
        assert!(matches!(result, Err(PersistenceError::Io { .. })));
        assert_eq!(table.height(), 7);
    }
}
