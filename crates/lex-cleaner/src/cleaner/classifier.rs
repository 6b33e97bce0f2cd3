use crate::table::{Column, Table};
use crate::types::{ColumnClassification, ColumnKind};

/// Numeric when there is at least one number and every present value is a
/// number. Columns without numeric evidence are categorical.
pub fn classify_column(column: &Column) -> ColumnKind {
    let mut has_number = false;
    for cell in column.cells() {
        if cell.is_number() {
            has_number = true;
        } else if !cell.is_missing() {
            return ColumnKind::Categorical;
        }
    }

    if has_number {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

/// Partition every column of `table` into numeric and categorical names.
pub fn classify_columns(table: &Table) -> ColumnClassification {
    let mut classification = ColumnClassification::default();
    for column in table.columns() {
        classification.push(column.name(), classify_column(column));
    }
    classification
}
