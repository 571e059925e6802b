//! Cell keys and A1-style position labels.
//!
//! A [`CellKey`] identifies one cell on a sheet by zero-indexed row and
//! column. It is the key type for edit buffers and pending changes, and
//! displays in spreadsheet notation:
//!
//! ```
//! use sheetsync_core::CellKey;
//! let key = CellKey::new(4, 2);
//! assert_eq!(key.to_string(), "C5");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static A1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$").unwrap());

/// A (row, column) pair, zero-indexed.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellKey {
    pub row: usize,
    pub col: usize,
}

impl CellKey {
    pub fn new(row: usize, col: usize) -> CellKey {
        CellKey { row, col }
    }

    /// Parse spreadsheet notation ("A1", "c5", "AA10"). Returns None if invalid.
    pub fn parse_a1(name: &str) -> Option<CellKey> {
        let caps = A1.captures(name)?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        let mut col_acc = 0usize;
        for c in letters.to_ascii_uppercase().bytes() {
            let digit = (c - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        let col = col_acc.checked_sub(1)?;
        let row = numbers.parse::<usize>().ok()?.checked_sub(1)?;

        Some(CellKey::new(row, col))
    }
}

/// Convert a column index to letters (0 -> A, 25 -> Z, 26 -> AA).
pub fn col_to_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col as u128 + 1;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

/// Display position for a cell, e.g. (4, 2) -> "C5".
pub fn position_label(row: usize, col: usize) -> String {
    format!("{}{}", col_to_letters(col), row + 1)
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", col_to_letters(self.col), self.row + 1)
    }
}
