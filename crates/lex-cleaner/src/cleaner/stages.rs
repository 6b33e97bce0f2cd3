//! Row-level cleaning stages.
//!
//! Each stage takes a table and returns the (possibly unchanged) table with a
//! [`StageReport`] describing what it saw or did.

use crate::table::{CellKey, Table};
use crate::types::MissingSummary;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Outcome of a single cleaning stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageReport {
    ColumnsNormalized {
        /// Columns whose name changed.
        renamed: usize,
        /// Original names of columns dropped as duplicates.
        dropped: Vec<String>,
    },
    DuplicatesRemoved {
        removed: usize,
        remaining: usize,
    },
    MissingAccounted {
        empty_rows: usize,
        missing_summary: MissingSummary,
    },
    RowsPruned {
        removed: usize,
        remaining: usize,
    },
}

impl StageReport {
    /// One-line description for the action log.
    pub fn describe(&self) -> String {
        match self {
            StageReport::ColumnsNormalized { renamed, dropped } if dropped.is_empty() => {
                format!("Normalized column names ({} renamed)", renamed)
            }
            StageReport::ColumnsNormalized { renamed, dropped } => format!(
                "Normalized column names ({} renamed); dropped {} columns with duplicate names: {:?}",
                renamed,
                dropped.len(),
                dropped
            ),
            StageReport::DuplicatesRemoved { removed: 0, .. } => {
                "No duplicate rows found".to_string()
            }
            StageReport::DuplicatesRemoved { removed, remaining } => format!(
                "Removed {} duplicate rows ({:.1}%)",
                removed,
                percentage(*removed, removed + remaining)
            ),
            StageReport::MissingAccounted {
                empty_rows,
                missing_summary,
            } => format!(
                "Found {} empty rows and {} missing cells",
                empty_rows,
                missing_summary.total()
            ),
            StageReport::RowsPruned { removed: 0, .. } => {
                "No rows with missing values found".to_string()
            }
            StageReport::RowsPruned { removed, remaining } => format!(
                "Removed {} rows with missing values ({:.1}%)",
                removed,
                percentage(*removed, removed + remaining)
            ),
        }
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Keep the first occurrence of every distinct row, in order.
pub(crate) fn remove_duplicate_rows(table: Table) -> (Table, StageReport) {
    let keep: Vec<usize> = {
        let mut seen: HashSet<Vec<CellKey<'_>>> = HashSet::with_capacity(table.height());
        table
            .rows()
            .enumerate()
            .filter(|(_, row)| seen.insert(row.iter().map(|&cell| cell.key()).collect()))
            .map(|(index, _)| index)
            .collect()
    };

    let removed = table.height() - keep.len();
    debug!("Removed {} duplicate rows", removed);
    let table = if removed == 0 {
        table
    } else {
        table.select_rows(&keep)
    };

    let remaining = table.height();
    (table, StageReport::DuplicatesRemoved { removed, remaining })
}

/// Count fully-empty rows and per-column missing cells. Does not change the
/// table.
pub(crate) fn account_missing(table: Table) -> (Table, StageReport) {
    let empty_rows = table
        .rows()
        .filter(|row| row.iter().all(|cell| cell.is_missing()))
        .count();

    let missing_summary = MissingSummary::new(
        table
            .columns()
            .iter()
            .map(|column| (column.name().to_string(), column.missing_count()))
            .collect(),
    );

    debug!(
        "{} empty rows, {} missing cells",
        empty_rows,
        missing_summary.total()
    );
    (
        table,
        StageReport::MissingAccounted {
            empty_rows,
            missing_summary,
        },
    )
}

/// Drop every row with at least one missing cell.
pub(crate) fn prune_incomplete_rows(table: Table) -> (Table, StageReport) {
    let keep: Vec<usize> = table
        .rows()
        .enumerate()
        .filter(|(_, row)| !row.iter().any(|cell| cell.is_missing()))
        .map(|(index, _)| index)
        .collect();

    let removed = table.height() - keep.len();
    debug!("Pruned {} rows with missing values", removed);
    let table = if removed == 0 {
        table
    } else {
        table.select_rows(&keep)
    };

    let remaining = table.height();
    (table, StageReport::RowsPruned { removed, remaining })
}
