//! Workbook model: a [`Document`] is an ordered list of named [`Sheet`]s.
//!
//! Rows are expected to share a column count but nothing relies on it:
//! reads past the end of a short row yield [`CellValue::Empty`].

use crate::cell_key::CellKey;
use crate::value::{self, CellValue};
use serde::{Deserialize, Serialize};

/// Rows and columns of a freshly created sheet.
pub const NEW_SHEET_ROWS: usize = 5;
pub const NEW_SHEET_COLS: usize = 5;

static EMPTY: CellValue = CellValue::Empty;

/// One named grid of cells.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// A blank sheet of `NEW_SHEET_ROWS` x `NEW_SHEET_COLS` empty cells.
    pub fn blank(name: impl Into<String>) -> Self {
        Self::new(name, vec![vec![CellValue::Empty; NEW_SHEET_COLS]; NEW_SHEET_ROWS])
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width used for new rows: the first row's length (0 if the sheet is empty).
    pub fn first_row_width(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    /// Widest row in the sheet.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// Value at (row, col); missing cells read as Empty.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Display string for a cell.
    pub fn formatted(&self, row: usize, col: usize) -> String {
        value::format(self.cell(row, col))
    }

    /// Write a value, padding a short row with Empty. Returns false if the row is missing.
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) -> bool {
        let Some(cells) = self.rows.get_mut(row) else {
            return false;
        };
        if col >= cells.len() {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;
        true
    }

    /// Contents of one column, one entry per row (missing cells as Empty).
    pub fn column(&self, col: usize) -> Vec<CellValue> {
        self.rows
            .iter()
            .map(|r| r.get(col).cloned().unwrap_or_default())
            .collect()
    }

    /// True when every cell is empty.
    pub fn is_blank(&self) -> bool {
        self.rows.iter().flatten().all(CellValue::is_empty)
    }
}

/// A workbook mirror or backend copy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub file_name: String,
    pub sheets: Vec<Sheet>,
}

impl Document {
    pub fn new(file_name: impl Into<String>, sheets: Vec<Sheet>) -> Self {
        Self {
            file_name: file_name.into(),
            sheets,
        }
    }

    /// An untitled workbook with a single blank sheet.
    pub fn untitled() -> Self {
        Self::new("untitled.xlsx", vec![Sheet::blank("Sheet1")])
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    /// Value at a cell on a sheet; anything missing reads as Empty.
    pub fn cell(&self, sheet: usize, key: CellKey) -> &CellValue {
        self.sheet(sheet)
            .map(|s| s.cell(key.row, key.col))
            .unwrap_or(&EMPTY)
    }

    pub fn formatted(&self, sheet: usize, key: CellKey) -> String {
        value::format(self.cell(sheet, key))
    }

    /// First free "SheetN" name.
    pub fn next_sheet_name(&self) -> String {
        let mut n = self.sheets.len() + 1;
        loop {
            let candidate = format!("Sheet{}", n);
            if !self.sheets.iter().any(|s| s.name == candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}
