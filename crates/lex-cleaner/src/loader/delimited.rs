//! Delimited text parsing.

use crate::error::LoadError;
use crate::table::{Cell, Table};
use csv::ReaderBuilder;

/// Parse decoded text into a table, using the first record as the header.
pub(crate) fn parse(text: &str, delimiter: u8, missing_markers: &[String]) -> Result<Table, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(index, name)| header_name(index, name))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| Cell::parse(field, missing_markers))
                .collect(),
        );
    }

    Ok(Table::from_rows(headers, rows)?)
}

/// Blank header cells get a positional placeholder name.
pub(crate) fn header_name(index: usize, raw: &str) -> String {
    if raw.trim().is_empty() {
        format!("Unnamed: {index}")
    } else {
        raw.to_string()
    }
}
