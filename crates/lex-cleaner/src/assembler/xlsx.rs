//! Minimal single-sheet xlsx writer.
//!
//! Only the parts a reader needs to locate the first worksheet are written.
//! Text goes in as inline strings, so there is no shared string table and no
//! styles part.

use crate::error::PersistenceError;
use crate::table::{Cell, Table};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fmt::Display;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

const SHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

fn spreadsheet_error(error: impl Display) -> PersistenceError {
    PersistenceError::Spreadsheet(error.to_string())
}

/// Write `table` to `path` as an xlsx workbook with one sheet.
pub(crate) fn write(table: &Table, path: &Path) -> Result<(), PersistenceError> {
    let file = File::create(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_workbook(table, file)
}

fn write_workbook<W: Write + Seek>(table: &Table, inner: W) -> Result<(), PersistenceError> {
    let sheet = sheet_xml(table)?;
    let options = SimpleFileOptions::default();
    let mut zip = ZipWriter::new(inner);

    let parts: [(&str, &[u8]); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", ROOT_RELS.as_bytes()),
        ("xl/workbook.xml", WORKBOOK.as_bytes()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()),
        ("xl/worksheets/sheet1.xml", &sheet),
    ];
    for (name, contents) in parts {
        zip.start_file(name, options).map_err(spreadsheet_error)?;
        zip.write_all(contents).map_err(spreadsheet_error)?;
    }

    zip.finish().map_err(spreadsheet_error)?;
    Ok(())
}

/// Render the worksheet part. Row 1 is the header.
fn sheet_xml(table: &Table) -> Result<Vec<u8>, PersistenceError> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(spreadsheet_error)?;
    writer
        .write_event(Event::Start(
            BytesStart::new("worksheet").with_attributes([("xmlns", SHEET_NS)]),
        ))
        .map_err(spreadsheet_error)?;

    if table.width() > 0 {
        let last = format!("{}{}", column_letters(table.width() - 1), table.height() + 1);
        let range = format!("A1:{last}");
        writer
            .write_event(Event::Empty(
                BytesStart::new("dimension").with_attributes([("ref", range.as_str())]),
            ))
            .map_err(spreadsheet_error)?;
    }

    writer
        .write_event(Event::Start(BytesStart::new("sheetData")))
        .map_err(spreadsheet_error)?;

    let header: Vec<Cell> = table
        .columns()
        .iter()
        .map(|column| Cell::from(column.name()))
        .collect();
    write_row(&mut writer, 1, header.iter())?;
    for (index, row) in table.rows().enumerate() {
        write_row(&mut writer, index + 2, row.into_iter())?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("sheetData")))
        .map_err(spreadsheet_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("worksheet")))
        .map_err(spreadsheet_error)?;

    Ok(writer.into_inner())
}

fn write_row<'c>(
    writer: &mut Writer<Vec<u8>>,
    number: usize,
    cells: impl Iterator<Item = &'c Cell>,
) -> Result<(), PersistenceError> {
    let row_ref = number.to_string();
    writer
        .write_event(Event::Start(
            BytesStart::new("row").with_attributes([("r", row_ref.as_str())]),
        ))
        .map_err(spreadsheet_error)?;

    for (index, cell) in cells.enumerate() {
        let cell_ref = format!("{}{}", column_letters(index), number);
        match cell {
            Cell::Missing => {}
            Cell::Number(value) if value.is_finite() => {
                writer
                    .write_event(Event::Start(
                        BytesStart::new("c").with_attributes([("r", cell_ref.as_str())]),
                    ))
                    .map_err(spreadsheet_error)?;
                write_text_element(writer, "v", &value.to_string(), false)?;
                writer
                    .write_event(Event::End(BytesEnd::new("c")))
                    .map_err(spreadsheet_error)?;
            }
            // infinities and text go in as strings
            other => {
                writer
                    .write_event(Event::Start(BytesStart::new("c").with_attributes([
                        ("r", cell_ref.as_str()),
                        ("t", "inlineStr"),
                    ])))
                    .map_err(spreadsheet_error)?;
                writer
                    .write_event(Event::Start(BytesStart::new("is")))
                    .map_err(spreadsheet_error)?;
                write_text_element(writer, "t", &other.to_string(), true)?;
                writer
                    .write_event(Event::End(BytesEnd::new("is")))
                    .map_err(spreadsheet_error)?;
                writer
                    .write_event(Event::End(BytesEnd::new("c")))
                    .map_err(spreadsheet_error)?;
            }
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new("row")))
        .map_err(spreadsheet_error)?;
    Ok(())
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
    preserve_space: bool,
) -> Result<(), PersistenceError> {
    let mut start = BytesStart::new(name);
    if preserve_space {
        start.push_attribute(("xml:space", "preserve"));
    }
    writer
        .write_event(Event::Start(start))
        .map_err(spreadsheet_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(spreadsheet_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(spreadsheet_error)?;
    Ok(())
}

/// Zero-based column index to spreadsheet letters (`0` → `A`, `26` → `AA`).
fn column_letters(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
