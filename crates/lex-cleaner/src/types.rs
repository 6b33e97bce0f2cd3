use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Per-column missing-cell counts, in column order.
///
/// Serialized as a JSON object keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingSummary(Vec<(String, usize)>);

impl MissingSummary {
    pub fn new(counts: Vec<(String, usize)>) -> Self {
        Self(counts)
    }

    /// Missing count for `column`, if it is part of the summary.
    pub fn get(&self, column: &str) -> Option<usize> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, count)| *count)
    }

    /// `(column, missing count)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Sum of missing cells across all columns.
    pub fn total(&self) -> usize {
        self.0.iter().map(|(_, count)| count).sum()
    }
}

impl Serialize for MissingSummary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, count) in &self.0 {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

/// What the cleaning pipeline did to one table.
///
/// Counts are taken at the point in the pipeline where they are meaningful:
/// `empty_columns` at load time, `empty_rows` and `missing_summary` after
/// deduplication but before rows with missing cells are pruned.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningMetrics {
    /// `(rows, columns)` as parsed, before any column was dropped.
    pub original_shape: (usize, usize),
    /// Rows left after duplicate removal.
    pub rows_after_dedup: usize,
    /// `(rows, columns)` of the cleaned table.
    pub processed_shape: (usize, usize),
    /// Duplicate rows removed.
    pub removed_duplicates: usize,
    /// Rows whose every cell was missing, before pruning.
    pub empty_rows: usize,
    /// All-missing columns dropped at load time.
    pub empty_columns: usize,
    /// Columns dropped because their normalized name was already taken.
    pub dropped_duplicate_columns: Vec<String>,
    /// Missing cells per surviving column, before pruning.
    pub missing_summary: MissingSummary,
    /// Human-readable log of the steps taken.
    pub actions: Vec<String>,
}

impl CleaningMetrics {
    /// Rows removed because they had at least one missing cell.
    pub fn pruned_rows(&self) -> usize {
        self.rows_after_dedup.saturating_sub(self.processed_shape.0)
    }

    /// Total rows removed by cleaning.
    pub fn rows_removed(&self) -> usize {
        self.original_shape.0.saturating_sub(self.processed_shape.0)
    }

    /// Total columns removed by cleaning.
    pub fn columns_removed(&self) -> usize {
        self.original_shape.1.saturating_sub(self.processed_shape.1)
    }
}

/// Whether a column holds numbers or anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => f.write_str("numeric"),
            ColumnKind::Categorical => f.write_str("categorical"),
        }
    }
}

/// Partition of a table's column names by [`ColumnKind`], in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnClassification {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnClassification {
    pub fn push(&mut self, name: impl Into<String>, kind: ColumnKind) {
        match kind {
            ColumnKind::Numeric => self.numeric.push(name.into()),
            ColumnKind::Categorical => self.categorical.push(name.into()),
        }
    }

    /// Kind of `column`, or `None` if the column was not classified.
    pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
        if self.numeric.iter().any(|name| name == column) {
            Some(ColumnKind::Numeric)
        } else if self.categorical.iter().any(|name| name == column) {
            Some(ColumnKind::Categorical)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_summary_serializes_as_ordered_map() {
        let summary = MissingSummary::new(vec![("b".to_string(), 2), ("a".to_string(), 0)]);
        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(json, r#"{"b":2,"a":0}"#);
        assert_eq!(summary.get("b"), Some(2));
        assert_eq!(summary.get("z"), None);
        assert_eq!(summary.total(), 2);
    }

    #[test]
    fn test_metrics_derived_counts() {
        let metrics = CleaningMetrics {
            original_shape: (10, 4),
            rows_after_dedup: 8,
            processed_shape: (6, 3),
            ..Default::default()
        };
        assert_eq!(metrics.pruned_rows(), 2);
        assert_eq!(metrics.rows_removed(), 4);
        assert_eq!(metrics.columns_removed(), 1);
    }

    #[test]
    fn test_classification_lookup() {
        let mut classification = ColumnClassification::default();
        classification.push("age", ColumnKind::Numeric);
        classification.push("name", ColumnKind::Categorical);
        assert_eq!(classification.kind_of("age"), Some(ColumnKind::Numeric));
        assert_eq!(classification.kind_of("name"), Some(ColumnKind::Categorical));
        assert_eq!(classification.kind_of("other"), None);
        assert_eq!(classification.len(), 2);
    }
}
