//! Loading raw bytes into a [`Table`].
//!
//! Delimited input is decoded by trying each configured encoding in order;
//! the first one that both decodes strictly and parses wins. Spreadsheet input
//! has a single strategy. Either way, columns with no values at all are
//! dropped before the table is returned, and the count is kept in the table's
//! [`Provenance`](crate::table::Provenance).

mod delimited;
mod encoding;
mod spreadsheet;

use crate::config::CleanerConfig;
use crate::error::LoadError;
use crate::table::{Provenance, Table};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Declared input format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatHint {
    /// Delimited text using the configured delimiter.
    #[default]
    Delimited,
    /// Delimited text using tabs regardless of configuration.
    TabDelimited,
    /// An xlsx workbook.
    Spreadsheet,
}

impl FormatHint {
    /// Map a file extension (without the dot, any case) to a format.
    pub fn from_extension(extension: &str) -> Result<Self, LoadError> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" | "txt" => Ok(Self::Delimited),
            "tsv" => Ok(Self::TabDelimited),
            "xlsx" => Ok(Self::Spreadsheet),
            other => Err(LoadError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Derive the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| LoadError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_extension(extension)
    }

    /// Field delimiter to use for this format.
    pub fn delimiter(&self, config: &CleanerConfig) -> u8 {
        match self {
            Self::TabDelimited => b'\t',
            _ => config.delimiter,
        }
    }
}

impl fmt::Display for FormatHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Delimited => "delimited",
            Self::TabDelimited => "tab_delimited",
            Self::Spreadsheet => "spreadsheet",
        };
        f.write_str(name)
    }
}

impl FromStr for FormatHint {
    type Err = LoadError;

    /// Accepts format names (`delimited`, `spreadsheet`, ...) or extensions.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "delimited" => Ok(Self::Delimited),
            "tab_delimited" => Ok(Self::TabDelimited),
            "spreadsheet" => Ok(Self::Spreadsheet),
            other => Self::from_extension(other.trim_start_matches('.')),
        }
    }
}

/// Parse `bytes` into a table.
///
/// # Errors
///
/// - [`LoadError::EmptyInput`] for zero bytes.
/// - [`LoadError::UnsupportedEncoding`] when no candidate decodes the input.
/// - A parse error when some candidate decoded the input but none parsed it.
/// - [`LoadError::Spreadsheet`] / [`LoadError::NoWorksheet`] for bad workbooks.
pub fn load(bytes: &[u8], hint: FormatHint, config: &CleanerConfig) -> Result<Table, LoadError> {
    if bytes.is_empty() {
        return Err(LoadError::EmptyInput);
    }

    let table = match hint {
        FormatHint::Spreadsheet => spreadsheet::parse(bytes, &config.missing_markers)?,
        _ => load_delimited(bytes, hint.delimiter(config), config)?,
    };

    let table = drop_empty_columns(table);
    info!(
        "Loaded {} table: {} rows x {} columns ({} empty columns dropped)",
        hint,
        table.height(),
        table.width(),
        table.provenance().empty_columns
    );
    Ok(table)
}

/// Read a file and [`load`] it, deriving the format from its extension.
pub fn load_path(path: impl AsRef<Path>, config: &CleanerConfig) -> Result<Table, LoadError> {
    let path = path.as_ref();
    let hint = FormatHint::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load(&bytes, hint, config)
}

fn load_delimited(bytes: &[u8], delimiter: u8, config: &CleanerConfig) -> Result<Table, LoadError> {
    let mut parse_error = None;

    for label in &config.encoding_candidates {
        let Some(text) = encoding::decode(bytes, label) else {
            debug!("Input is not valid {}", label);
            continue;
        };

        match delimited::parse(&text, delimiter, &config.missing_markers) {
            Ok(table) => {
                debug!("Decoded input as {}", label);
                return Ok(table);
            }
            Err(e) => {
                debug!("Input decoded as {} but failed to parse: {}", label, e);
                parse_error.get_or_insert(e);
            }
        }
    }

    Err(parse_error.unwrap_or_else(|| LoadError::UnsupportedEncoding {
        tried: config.encoding_candidates.clone(),
    }))
}

/// Remove columns whose every cell is missing, recording the pre-drop shape.
fn drop_empty_columns(table: Table) -> Table {
    let original_shape = table.shape();
    let mut empty_columns = 0;

    let table = table.map_columns(|columns| {
        columns
            .into_iter()
            .filter(|column| {
                if column.is_all_missing() {
                    debug!("Dropping empty column '{}'", column.name());
                    empty_columns += 1;
                    false
                } else {
                    true
                }
            })
            .collect()
    });

    table.with_provenance(Provenance {
        original_shape,
        empty_columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FormatHint::from_extension("CSV").unwrap(), FormatHint::Delimited);
        assert_eq!(FormatHint::from_extension("tsv").unwrap(), FormatHint::TabDelimited);
        assert_eq!(FormatHint::from_extension("xlsx").unwrap(), FormatHint::Spreadsheet);
        // written back as a plain workbook, which Excel refuses under .xlsm
        assert!(matches!(
            FormatHint::from_extension("xlsm"),
            Err(LoadError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            FormatHint::from_extension("pdf"),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "pdf"
        ));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("spreadsheet".parse::<FormatHint>().unwrap(), FormatHint::Spreadsheet);
        assert_eq!("tab-delimited".parse::<FormatHint>().unwrap(), FormatHint::TabDelimited);
        assert_eq!(".csv".parse::<FormatHint>().unwrap(), FormatHint::Delimited);
        assert!("parquet".parse::<FormatHint>().is_err());
    }

    #[test]
    fn test_empty_input() {
        let result = load(b"", FormatHint::Delimited, &CleanerConfig::default());
        assert!(matches!(result, Err(LoadError::EmptyInput)));
    }

    #[test]
    fn test_drops_all_missing_columns() {
        let table = load(
            b"a,blank,b\n1,,x\n2,NA,y\n",
            FormatHint::Delimited,
            &CleanerConfig::default(),
        )
        .unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert_eq!(table.provenance().original_shape, (2, 3));
        assert_eq!(table.provenance().empty_columns, 1);
    }

    #[test]
    fn test_falls_back_to_next_encoding() {
        let table = load(
            b"city\nM\xFCnchen\n",
            FormatHint::Delimited,
            &CleanerConfig::default(),
        )
        .unwrap();
        assert_eq!(table.row(0), vec![&Cell::from("München")]);
    }

    #[test]
    fn test_utf8_with_control_characters_loads_as_utf8() {
        let config = CleanerConfig::default();
        let table = load(b"name,note\nann,\x1b[1mbold\x1b[0m\n", FormatHint::Delimited, &config)
            .unwrap();
        assert_eq!(
            table.row(0),
            vec![&Cell::from("ann"), &Cell::from("\u{1b}[1mbold\u{1b}[0m")]
        );

        // trailing DOS end-of-file marker
        let table = load(b"a,b\n1,2\n\x1a", FormatHint::Delimited, &config).unwrap();
        assert_eq!(table.height(), 2);
    }

    #[test]
    fn test_all_candidates_fail() {
        let config = CleanerConfig::builder()
            .encoding_candidates(["utf-8"])
            .build()
            .unwrap();
        let result = load(b"caf\xE9\n", FormatHint::Delimited, &config);
        match result {
            Err(LoadError::UnsupportedEncoding { tried }) => assert_eq!(tried, vec!["utf-8"]),
            other => panic!("expected UnsupportedEncoding, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_wins_over_encoding_error() {
        let result = load(b"a\n1,2\n", FormatHint::Delimited, &CleanerConfig::default());
        assert!(matches!(result, Err(LoadError::Malformed(_))));
    }

    #[test]
    fn test_tab_delimited_ignores_configured_delimiter() {
        let table = load(b"a\tb\n1\t2\n", FormatHint::TabDelimited, &CleanerConfig::default())
            .unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_load_path_missing_file() {
        let result = load_path("does/not/exist.csv", &CleanerConfig::default());
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }
}
