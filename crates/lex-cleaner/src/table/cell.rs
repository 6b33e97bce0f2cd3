//! Scalar cell values.

use serde::{Serialize, Serializer};
use std::fmt;

/// A single scalar value in a [`Table`](super::Table).
///
/// Every parsed field is tagged exactly once at load time, so "empty string",
/// "missing marker" and "NaN" all collapse to [`Cell::Missing`] before any
/// cleaning step looks at the data.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// No value (blank field, missing marker, NaN, spreadsheet error).
    #[default]
    Missing,
    /// A finite or infinite float. Never NaN.
    Number(f64),
    /// Any value that is neither missing nor numeric, kept verbatim.
    Text(String),
}

impl Cell {
    /// Tag a raw field.
    ///
    /// The trimmed value is checked against `missing_markers` first, then
    /// against the default `f64` parser. Anything else is kept as text with
    /// its original spacing.
    pub fn parse(raw: &str, missing_markers: &[String]) -> Self {
        let trimmed = raw.trim();
        if missing_markers.iter().any(|marker| marker == trimmed) {
            return Cell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(value) => Cell::number(value),
            Err(_) => Cell::Text(raw.to_string()),
        }
    }

    /// Build a numeric cell, folding NaN into [`Cell::Missing`].
    pub fn number(value: f64) -> Self {
        if value.is_nan() {
            Cell::Missing
        } else {
            Cell::Number(value)
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Cell::Number(_))
    }

    /// Convert to a JSON value (`null`, number or string).
    ///
    /// Whole numbers that fit in an `i64` are emitted as integers so that
    /// sample rows read the way the source file did.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Cell::Missing => serde_json::Value::Null,
            Cell::Number(value) => {
                if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                    serde_json::Value::from(*value as i64)
                } else {
                    serde_json::Number::from_f64(*value)
                        .map(serde_json::Value::Number)
                        .unwrap_or_else(|| serde_json::Value::String(value.to_string()))
                }
            }
            Cell::Text(value) => serde_json::Value::String(value.clone()),
        }
    }

    /// Hashable identity used for row deduplication.
    pub(crate) fn key(&self) -> CellKey<'_> {
        match self {
            Cell::Missing => CellKey::Missing,
            // -0.0 and 0.0 compare equal, so they must share a key
            Cell::Number(value) if *value == 0.0 => CellKey::Number(0.0f64.to_bits()),
            Cell::Number(value) => CellKey::Number(value.to_bits()),
            Cell::Text(value) => CellKey::Text(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CellKey<'a> {
    Missing,
    Number(u64),
    Text(&'a str),
}

/// Missing cells render as an empty string; numbers use the shortest form
/// that parses back to the same value.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Number(value) => write!(f, "{}", value),
            Cell::Text(value) => f.write_str(value),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> Vec<String> {
        ["", "NA", "null"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_missing_markers() {
        assert_eq!(Cell::parse("", &markers()), Cell::Missing);
        assert_eq!(Cell::parse("   ", &markers()), Cell::Missing);
        assert_eq!(Cell::parse(" NA ", &markers()), Cell::Missing);
        assert_eq!(Cell::parse("null", &markers()), Cell::Missing);
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(Cell::parse("42", &markers()), Cell::Number(42.0));
        assert_eq!(Cell::parse(" -1.5 ", &markers()), Cell::Number(-1.5));
        assert_eq!(Cell::parse("1e3", &markers()), Cell::Number(1000.0));
    }

    #[test]
    fn test_parse_nan_is_missing() {
        assert_eq!(Cell::parse("NaN", &markers()), Cell::Missing);
    }

    #[test]
    fn test_parse_text_keeps_spacing() {
        assert_eq!(
            Cell::parse(" Alice ", &markers()),
            Cell::Text(" Alice ".to_string())
        );
        assert_eq!(Cell::parse("$12", &markers()), Cell::Text("$12".to_string()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Cell::Missing.to_string(), "");
        assert_eq!(Cell::Number(3.0).to_string(), "3");
        assert_eq!(Cell::Number(2.5).to_string(), "2.5");
        assert_eq!(Cell::from("x").to_string(), "x");
    }

    #[test]
    fn test_to_json() {
        assert_eq!(Cell::Missing.to_json(), serde_json::Value::Null);
        assert_eq!(Cell::Number(7.0).to_json(), serde_json::json!(7));
        assert_eq!(Cell::Number(0.25).to_json(), serde_json::json!(0.25));
        assert_eq!(Cell::from("a").to_json(), serde_json::json!("a"));
    }

    #[test]
    fn test_signed_zero_shares_key() {
        assert_eq!(Cell::Number(-0.0).key(), Cell::Number(0.0).key());
    }
}
