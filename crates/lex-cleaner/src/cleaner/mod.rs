//! Data cleaning module.
//!
//! This module provides functionality for:
//! - Normalizing column names and dropping columns whose names collide
//! - Removing duplicate rows
//! - Counting empty rows and missing cells
//! - Removing rows with any missing value
//! - Classifying columns as numeric or categorical
//!
//! The order is fixed. Counts taken by later stages depend on what earlier
//! stages removed.

mod classifier;
mod column_names;
mod stages;

pub use classifier::{classify_column, classify_columns};
pub use column_names::normalize_column_name;
pub use stages::StageReport;

use crate::error::PipelineError;
use crate::table::Table;
use crate::types::CleaningMetrics;
use tracing::{debug, info};

/// Runs the cleaning stages over a loaded table.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataCleaner;

impl DataCleaner {
    /// Clean `table` and return it with the metrics gathered on the way.
    ///
    /// # Errors
    ///
    /// [`PipelineError::NoColumns`] when the table has no columns left after
    /// loading.
    pub fn clean(&self, table: Table) -> Result<(Table, CleaningMetrics), PipelineError> {
        if table.width() == 0 {
            return Err(PipelineError::NoColumns);
        }

        info!("Performing automatic data cleaning...");
        let provenance = table.provenance();
        let mut metrics = CleaningMetrics {
            original_shape: provenance.original_shape,
            empty_columns: provenance.empty_columns,
            ..Default::default()
        };
        if provenance.empty_columns > 0 {
            metrics.actions.push(format!(
                "Removed {} empty columns",
                provenance.empty_columns
            ));
        }

        let steps: [fn(Table) -> (Table, StageReport); 4] = [
            column_names::normalize_columns,
            stages::remove_duplicate_rows,
            stages::account_missing,
            stages::prune_incomplete_rows,
        ];

        let mut table = table;
        for step in steps {
            let (next, report) = step(table);
            debug!("{}", report.describe());
            record(&mut metrics, report);
            table = next;
        }

        metrics.processed_shape = table.shape();
        info!(
            "Cleaning complete: {:?} -> {:?}",
            metrics.original_shape, metrics.processed_shape
        );
        Ok((table, metrics))
    }
}

/// Fold one stage's report into the running metrics.
fn record(metrics: &mut CleaningMetrics, report: StageReport) {
    metrics.actions.push(report.describe());
    match report {
        StageReport::ColumnsNormalized { dropped, .. } => {
            metrics.dropped_duplicate_columns = dropped;
        }
        StageReport::DuplicatesRemoved { removed, remaining } => {
            metrics.removed_duplicates = removed;
            metrics.rows_after_dedup = remaining;
        }
        StageReport::MissingAccounted {
            empty_rows,
            missing_summary,
        } => {
            metrics.empty_rows = empty_rows;
            metrics.missing_summary = missing_summary;
        }
        StageReport::RowsPruned { .. } => {}
    }
}
