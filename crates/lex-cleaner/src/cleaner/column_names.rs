//! Column name normalization.

use super::stages::StageReport;
use crate::table::Table;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

static NON_WORD_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("valid column name pattern"));

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Normalize one header to `[a-z0-9_]`.
///
/// Surrounding whitespace and punctuation are stripped, the rest is
/// lowercased and every run of other characters becomes a single `_`.
/// Returns an empty string when nothing usable is left.
///
/// ```
/// use lex_cleaner::cleaner::normalize_column_name;
///
/// assert_eq!(normalize_column_name("  First Name "), "first_name");
/// assert_eq!(normalize_column_name("AGE!!"), "age");
/// assert_eq!(normalize_column_name("price (USD)"), "price_usd");
/// ```
pub fn normalize_column_name(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches(|c: char| !is_word_char(c));
    NON_WORD_RUN
        .replace_all(&trimmed.to_lowercase(), "_")
        .into_owned()
}

/// Rename every column and drop later columns whose name is already taken.
pub(crate) fn normalize_columns(table: Table) -> (Table, StageReport) {
    let mut seen = HashSet::new();
    let mut renamed = 0;
    let mut dropped = Vec::new();

    let table = table.map_columns(|columns| {
        let mut kept = Vec::with_capacity(columns.len());
        for (index, column) in columns.into_iter().enumerate() {
            let raw = column.name().to_string();
            let mut name = normalize_column_name(&raw);
            if name.is_empty() {
                name = format!("unnamed_{index}");
            }

            if !seen.insert(name.clone()) {
                debug!("Dropping column '{}': normalized name '{}' already used", raw, name);
                dropped.push(raw);
                continue;
            }

            if name != raw {
                renamed += 1;
            }
            kept.push(column.rename(name));
        }
        kept
    });

    (table, StageReport::ColumnsNormalized { renamed, dropped })
}
