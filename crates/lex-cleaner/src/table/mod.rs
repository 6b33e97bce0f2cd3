//! In-memory tabular data.
//!
//! A [`Table`] is an ordered list of named [`Column`]s sharing one row count.
//! Rows have no identity beyond their position. Tables are plain values:
//! every cleaning step consumes one and returns a new one.

mod cell;

pub use cell::Cell;
pub(crate) use cell::CellKey;

use serde::Serialize;
use thiserror::Error;

/// Number of leading rows included in sample digests.
pub const SAMPLE_SIZE: usize = 5;

/// An ordered mapping of column name to JSON value for one row.
pub type SampleRow = serde_json::Map<String, serde_json::Value>;

/// Errors raised while assembling a table from raw rows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Row {row} has {found} fields but the header has {expected}")]
    RowTooWide {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Column '{column}' has {found} cells, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// A named sequence of cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    name: String,
    cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of [`Cell::Missing`] entries.
    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_missing()).count()
    }

    /// True when every cell is missing. Vacuously true for zero rows.
    pub fn is_all_missing(&self) -> bool {
        self.cells.iter().all(Cell::is_missing)
    }

    pub(crate) fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn take_rows(&self, rows: &[usize]) -> Self {
        Self {
            name: self.name.clone(),
            cells: rows.iter().map(|&row| self.cells[row].clone()).collect(),
        }
    }
}

/// Where a table came from, as seen by the loader.
///
/// The loader drops all-missing columns before handing the table over, so the
/// shape it originally parsed has to travel with the table for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Provenance {
    /// Shape `(rows, columns)` as parsed, before any column was dropped.
    pub original_shape: (usize, usize),
    /// All-missing columns removed right after parsing.
    pub empty_columns: usize,
}

/// Columnar table of tagged cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    height: usize,
    provenance: Provenance,
}

impl Table {
    /// Build a table from columns of equal length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, TableError> {
        let height = columns.first().map(Column::len).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|column| column.len() != height) {
            return Err(TableError::ColumnLength {
                column: bad.name.clone(),
                expected: height,
                found: bad.len(),
            });
        }
        Ok(Self::from_parts(columns, height))
    }

    /// Build a table from a header and row-major cells.
    ///
    /// Rows shorter than the header are padded with [`Cell::Missing`]; rows
    /// wider than the header are rejected.
    pub fn from_rows<S: Into<String>>(
        headers: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Cell>>,
    ) -> Result<Self, TableError> {
        let names: Vec<String> = headers.into_iter().map(Into::into).collect();
        let width = names.len();
        let height = rows.len();
        let mut columns: Vec<Vec<Cell>> = (0..width).map(|_| Vec::with_capacity(height)).collect();

        for (index, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(TableError::RowTooWide {
                    row: index + 1,
                    expected: width,
                    found: row.len(),
                });
            }
            let found = row.len();
            for (column, cell) in columns.iter_mut().zip(row) {
                column.push(cell);
            }
            for column in columns.iter_mut().skip(found) {
                column.push(Cell::Missing);
            }
        }

        let columns = names
            .into_iter()
            .zip(columns)
            .map(|(name, cells)| Column::new(name, cells))
            .collect();
        Ok(Self::from_parts(columns, height))
    }

    /// A table with no columns and no rows.
    pub fn empty() -> Self {
        Self::from_parts(Vec::new(), 0)
    }

    fn from_parts(columns: Vec<Column>, height: usize) -> Self {
        let provenance = Provenance {
            original_shape: (height, columns.len()),
            empty_columns: 0,
        };
        Self {
            columns,
            height,
            provenance,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.columns.len())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Cells of row `index`, one per column. Panics if out of range.
    pub fn row(&self, index: usize) -> Vec<&Cell> {
        self.columns
            .iter()
            .map(|column| &column.cells[index])
            .collect()
    }

    /// Iterate over rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Cell>> + '_ {
        (0..self.height).map(move |index| self.row(index))
    }

    /// Keep only the given row positions, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            columns: self.columns.iter().map(|column| column.take_rows(rows)).collect(),
            height: rows.len(),
            provenance: self.provenance,
        }
    }

    /// Rebuild the column list, keeping row count and provenance.
    ///
    /// `f` must return columns derived from the ones it is given.
    pub(crate) fn map_columns<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Vec<Column>) -> Vec<Column>,
    {
        self.columns = f(std::mem::take(&mut self.columns));
        self
    }

    pub(crate) fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// The first `n` rows as ordered name→value maps.
    pub fn sample(&self, n: usize) -> Vec<SampleRow> {
        (0..self.height.min(n))
            .map(|index| {
                self.columns
                    .iter()
                    .map(|column| (column.name.clone(), column.cells[index].to_json()))
                    .collect()
            })
            .collect()
    }
}
