use crate::error::{CleaningError, Result};
use crate::pipeline::CleaningOutcome;
use crate::table::SampleRow;
use crate::types::MissingSummary;
use chrono::Local;
use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Text shown when no summary provider answered.
pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable";

/// Printed in the column breakdown for an empty group.
const NO_COLUMNS: &str = "None";

/// Everything a reader needs to judge one cleaning run.
///
/// Serialized as-is for `--emit-report`; its `Display` impl is the terminal
/// rendering.
#[derive(Debug, Clone, Serialize)]
pub struct CleaningReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Name of the input file
    pub input_file: String,
    pub overview: OverviewSection,
    /// Provider summary, or [`SUMMARY_UNAVAILABLE`]
    pub summary: String,
    pub columns: ColumnBreakdown,
    /// Missing cells per column, counted before pruning
    pub missing_values: MissingSummary,
    /// First rows of the cleaned data
    pub sample: Vec<SampleRow>,
    pub actions: Vec<String>,
    pub cleaned_file_path: PathBuf,
}

/// Headline counts of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverviewSection {
    pub original_shape: (usize, usize),
    pub processed_shape: (usize, usize),
    pub rows_removed: usize,
    pub columns_removed: usize,
    pub removed_duplicates: usize,
    pub empty_rows: usize,
    pub rows_with_missing_removed: usize,
    pub empty_columns: usize,
}

/// Column names grouped by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnBreakdown {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnBreakdown {
    fn joined(names: &[String]) -> String {
        if names.is_empty() {
            NO_COLUMNS.to_string()
        } else {
            names.join(", ")
        }
    }

    /// Comma-separated numeric columns, or `None`.
    pub fn numeric_list(&self) -> String {
        Self::joined(&self.numeric)
    }

    /// Comma-separated categorical columns, or `None`.
    pub fn categorical_list(&self) -> String {
        Self::joined(&self.categorical)
    }
}

impl CleaningReport {
    /// Build a report for `outcome`, read from `input_file`.
    pub fn from_outcome(input_file: impl Into<String>, outcome: &CleaningOutcome) -> Self {
        let record = &outcome.record;
        let metrics = record.metrics();

        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.into(),
            overview: OverviewSection {
                original_shape: metrics.original_shape,
                processed_shape: metrics.processed_shape,
                rows_removed: metrics.rows_removed(),
                columns_removed: metrics.columns_removed(),
                removed_duplicates: metrics.removed_duplicates,
                empty_rows: metrics.empty_rows,
                rows_with_missing_removed: metrics.pruned_rows(),
                empty_columns: metrics.empty_columns,
            },
            summary: outcome
                .summary
                .clone()
                .unwrap_or_else(|| SUMMARY_UNAVAILABLE.to_string()),
            columns: ColumnBreakdown {
                numeric: record.classification().numeric.clone(),
                categorical: record.classification().categorical.clone(),
            },
            missing_values: metrics.missing_summary.clone(),
            sample: record.sample().to_vec(),
            actions: metrics.actions.clone(),
            cleaned_file_path: record.cleaned_file_path().to_path_buf(),
        }
    }
}

/// Plain-text rendering for terminals and logs.
impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overview = &self.overview;

        writeln!(f, "Data Cleaning Report")?;
        writeln!(f, "====================")?;
        writeln!(f, "Input:     {}", self.input_file)?;
        writeln!(f, "Generated: {}", self.generated_at)?;
        writeln!(f)?;

        writeln!(f, "Dataset Overview")?;
        writeln!(f, "----------------")?;
        let rows = [
            ("Original Shape", format_shape(overview.original_shape)),
            ("Processed Shape", format_shape(overview.processed_shape)),
            ("Rows Removed", overview.rows_removed.to_string()),
            ("Columns Removed", overview.columns_removed.to_string()),
            ("Duplicate Rows Removed", overview.removed_duplicates.to_string()),
            ("Fully Empty Rows", overview.empty_rows.to_string()),
            (
                "Rows with Missing Values Removed",
                overview.rows_with_missing_removed.to_string(),
            ),
            ("Empty Columns Removed", overview.empty_columns.to_string()),
        ];
        for (label, value) in rows {
            writeln!(f, "  {:<34}{}", label, value)?;
        }
        writeln!(f)?;

        writeln!(f, "Summary")?;
        writeln!(f, "-------")?;
        writeln!(f, "  {}", self.summary)?;
        writeln!(f)?;

        writeln!(f, "Column Breakdown")?;
        writeln!(f, "----------------")?;
        writeln!(f, "  {:<14}{}", "Numeric", self.columns.numeric_list())?;
        writeln!(f, "  {:<14}{}", "Categorical", self.columns.categorical_list())?;
        writeln!(f)?;

        if self.missing_values.total() > 0 {
            writeln!(f, "Missing Values (before pruning)")?;
            writeln!(f, "-------------------------------")?;
            for (column, count) in self.missing_values.iter().filter(|(_, count)| *count > 0) {
                writeln!(f, "  {:<34}{}", column, count)?;
            }
            writeln!(f)?;
        }

        if !self.actions.is_empty() {
            writeln!(f, "Actions")?;
            writeln!(f, "-------")?;
            for action in &self.actions {
                writeln!(f, "  - {}", action)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Sample Cleaned Data (Top {} Rows)", self.sample.len())?;
        writeln!(f, "--------------------------------")?;
        if self.sample.is_empty() {
            writeln!(f, "  (no rows)")?;
        }
        for row in &self.sample {
            let cells: Vec<String> = row
                .iter()
                .map(|(name, value)| format!("{}={}", name, display_value(value)))
                .collect();
            writeln!(f, "  {}", cells.join(", "))?;
        }
        writeln!(f)?;

        writeln!(f, "Cleaned file: {}", self.cleaned_file_path.display())
    }
}

fn format_shape((rows, columns): (usize, usize)) -> String {
    format!("({}, {})", rows, columns)
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Writes reports next to the cleaned data.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write `report` as pretty JSON to `<output_dir>/report_<base_name>.json`.
    pub fn write_report_to_file(&self, report: &CleaningReport, base_name: &str) -> Result<PathBuf> {
        let report_path = self.output_dir.join(format!("report_{}.json", base_name));
        let failed = |e: std::io::Error| {
            CleaningError::ReportGenerationFailed(format!("{}: {}", report_path.display(), e))
        };

        fs::create_dir_all(&self.output_dir).map_err(failed)?;
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&report_path).map_err(failed)?;
        file.write_all(json.as_bytes()).map_err(failed)?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}
