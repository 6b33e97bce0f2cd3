use crate::error::PersistenceError;
use crate::table::Table;
use csv::WriterBuilder;
use std::fs::File;
use std::path::Path;

/// Write `table` as delimited text with a header row.
///
/// Missing cells become empty fields; numbers use their shortest
/// round-trip form.
pub(crate) fn write(table: &Table, path: &Path, delimiter: u8) -> Result<(), PersistenceError> {
    let file = File::create(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .from_writer(file);

    writer.write_record(table.columns().iter().map(|column| column.name()))?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    writer.flush().map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })
}
