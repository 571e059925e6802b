//! Operation results returned by the backend for every mutating command.
//!
//! An [`Operation`] describes what the backend just did in terms the local
//! mirror can replay (see [`crate::reducer::apply`]).

use crate::value::CellValue;
use serde::{Deserialize, Serialize};

/// One cell write inside an operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellChange {
    pub row: usize,
    pub col: usize,
    pub value: CellValue,
}

impl CellChange {
    pub fn new(row: usize, col: usize, value: CellValue) -> Self {
        Self { row, col, value }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    SetCell {
        sheet_index: usize,
        cell: CellChange,
    },
    /// Insert a row. `values` is `None` for a fresh row of Empty cells;
    /// `Some` holds the exact contents, which may be zero-length.
    AddRow {
        sheet_index: usize,
        row_index: usize,
        values: Option<Vec<CellValue>>,
    },
    DeleteRow {
        sheet_index: usize,
        row_index: usize,
    },
    /// Insert a column. `values` holds one entry per row when restoring.
    AddColumn {
        sheet_index: usize,
        col_index: usize,
        values: Vec<CellValue>,
    },
    DeleteColumn {
        sheet_index: usize,
        col_index: usize,
    },
    AddSheet {
        sheet_index: usize,
        name: String,
    },
    /// `sheet_index` is the sheet that should be active afterwards.
    DeleteSheet {
        sheet_index: usize,
    },
    Batch {
        sheet_index: usize,
        cells: Vec<CellChange>,
    },
}

impl Operation {
    pub fn sheet_index(&self) -> usize {
        match self {
            Operation::SetCell { sheet_index, .. }
            | Operation::AddRow { sheet_index, .. }
            | Operation::DeleteRow { sheet_index, .. }
            | Operation::AddColumn { sheet_index, .. }
            | Operation::DeleteColumn { sheet_index, .. }
            | Operation::AddSheet { sheet_index, .. }
            | Operation::DeleteSheet { sheet_index }
            | Operation::Batch { sheet_index, .. } => *sheet_index,
        }
    }

    /// Sheet-level operations change the sheet list itself.
    pub fn is_sheet_level(&self) -> bool {
        matches!(self, Operation::AddSheet { .. } | Operation::DeleteSheet { .. })
    }

    /// Short human-readable label for status messages.
    pub fn describe(&self) -> String {
        use crate::cell_key::{col_to_letters, position_label};
        match self {
            Operation::SetCell { cell, .. } => format!("set {}", position_label(cell.row, cell.col)),
            Operation::AddRow { row_index, .. } => format!("insert row {}", row_index + 1),
            Operation::DeleteRow { row_index, .. } => format!("delete row {}", row_index + 1),
            Operation::AddColumn { col_index, .. } => {
                format!("insert column {}", col_to_letters(*col_index))
            }
            Operation::DeleteColumn { col_index, .. } => {
                format!("delete column {}", col_to_letters(*col_index))
            }
            Operation::AddSheet { name, .. } => format!("add sheet {}", name),
            Operation::DeleteSheet { .. } => "delete sheet".to_string(),
            Operation::Batch { cells, .. } => format!("update {} cell(s)", cells.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_level_classification() {
        assert!(Operation::AddSheet { sheet_index: 1, name: "Sheet2".into() }.is_sheet_level());
        assert!(Operation::DeleteSheet { sheet_index: 0 }.is_sheet_level());
        assert!(!Operation::DeleteRow { sheet_index: 0, row_index: 1 }.is_sheet_level());
    }

    #[test]
    fn test_describe_uses_a1_labels() {
        let op = Operation::SetCell {
            sheet_index: 0,
            cell: CellChange::new(4, 2, CellValue::Number(1.0)),
        };
        assert_eq!(op.describe(), "set C5");
        let op = Operation::DeleteColumn { sheet_index: 0, col_index: 27 };
        assert_eq!(op.describe(), "delete column AB");
    }
}
