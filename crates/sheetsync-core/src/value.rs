//! Cell values and the text <-> value coercion used by every input surface.
//!
//! [`parse`] turns whatever the user typed into a typed [`CellValue`], and
//! [`format`] is the inverse display mapping. Both are total: malformed
//! numbers simply fall through to text.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Digit strings like "0908" keep their leading zero and stay text.
static LEADING_ZERO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^0[0-9]").unwrap());

/// A single cell value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    #[default]
    Empty,
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Parse raw user input into a cell value.
/// - Empty string -> Empty
/// - Leading zero followed by another digit -> Text (e.g. "007", "0908")
/// - Finite number -> Number
/// - "true"/"false" in any case -> Boolean
/// - Otherwise -> Text
pub fn parse(raw: &str) -> CellValue {
    if raw.is_empty() {
        return CellValue::Empty;
    }

    if LEADING_ZERO.is_match(raw) {
        return CellValue::text(raw);
    }

    if let Ok(n) = raw.parse::<f64>()
        && n.is_finite()
    {
        return CellValue::Number(n);
    }

    if raw.eq_ignore_ascii_case("true") {
        return CellValue::Boolean(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return CellValue::Boolean(false);
    }

    CellValue::text(raw)
}

/// Canonical display string for a value (Empty -> "").
pub fn format(value: &CellValue) -> String {
    value.to_string()
}
