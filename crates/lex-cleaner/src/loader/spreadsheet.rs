//! Workbook parsing. Only the first worksheet is read.

use crate::error::LoadError;
use crate::loader::delimited::header_name;
use crate::table::{Cell, Table};
use calamine::{Data, DataType, Reader, Xlsx};
use std::io::Cursor;

/// Parse the first worksheet of an xlsx workbook.
///
/// The first row of the used range is the header, unconditionally.
pub(crate) fn parse(bytes: &[u8], missing_markers: &[String]) -> Result<Table, LoadError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| LoadError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)?
        .map_err(|e| LoadError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::empty());
    };

    let headers: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(index, data)| match data {
            Data::String(name) => header_name(index, name),
            other => header_name(index, &to_cell(other, &[]).to_string()),
        })
        .collect();

    let rows = rows
        .map(|row| row.iter().map(|data| to_cell(data, missing_markers)).collect())
        .collect();

    Ok(Table::from_rows(headers, rows)?)
}

fn to_cell(data: &Data, missing_markers: &[String]) -> Cell {
    match data {
        Data::Int(value) => Cell::from(*value),
        Data::Float(value) => Cell::number(*value),
        Data::String(value) => Cell::parse(value, missing_markers),
        Data::Bool(value) => Cell::Text(value.to_string()),
        Data::Error(_) | Data::Empty => Cell::Missing,
        other => match other.as_datetime() {
            Some(datetime) => Cell::Text(datetime.format("%Y-%m-%dT%H:%M:%S").to_string()),
            None => Cell::Text(other.to_string()),
        },
    }
}
