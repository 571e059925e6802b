//! Applies backend-confirmed operations to the local document mirror.
//!
//! The reducer is used for undo/redo replay, structural edits and batch
//! writes: paths where no optimistic update has happened locally. Direct
//! grid edits write the mirror themselves and never come through here.
//!
//! Inconsistent operations (a sheet or row that no longer exists) are
//! skipped rather than treated as errors.

use crate::document::{Document, Sheet};
use crate::operation::{CellChange, Operation};
use crate::value::CellValue;

/// Outcome of applying one operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// The mirror was updated.
    Changed,
    /// The operation referenced something that no longer exists.
    Skipped,
    /// Sheet-level change: re-fetch the whole document from the backend.
    NeedsRefresh,
}

/// Apply an operation in place.
pub fn apply(document: &mut Document, operation: &Operation) -> Applied {
    if operation.is_sheet_level() {
        return Applied::NeedsRefresh;
    }

    let sheet_index = operation.sheet_index();
    let Some(sheet) = document.sheet_mut(sheet_index) else {
        log::debug!(
            "skipping {}: sheet {} does not exist",
            operation.describe(),
            sheet_index
        );
        return Applied::Skipped;
    };

    let applied = match operation {
        Operation::SetCell { cell, .. } => set_cell(sheet, cell),
        Operation::AddRow {
            row_index, values, ..
        } => add_row(sheet, *row_index, values.as_deref()),
        Operation::DeleteRow { row_index, .. } => delete_row(sheet, *row_index),
        Operation::AddColumn {
            col_index, values, ..
        } => add_column(sheet, *col_index, values),
        Operation::DeleteColumn { col_index, .. } => delete_column(sheet, *col_index),
        Operation::Batch { cells, .. } => {
            // Apply every change; report Changed if any landed.
            cells.iter().fold(Applied::Skipped, |acc, cell| {
                match (acc, set_cell(sheet, cell)) {
                    (Applied::Changed, _) | (_, Applied::Changed) => Applied::Changed,
                    _ => Applied::Skipped,
                }
            })
        }
        Operation::AddSheet { .. } | Operation::DeleteSheet { .. } => Applied::NeedsRefresh,
    };

    if applied == Applied::Skipped {
        log::debug!("skipping {}: target out of range", operation.describe());
    }
    applied
}

fn set_cell(sheet: &mut Sheet, cell: &CellChange) -> Applied {
    if sheet.set(cell.row, cell.col, cell.value.clone()) {
        Applied::Changed
    } else {
        Applied::Skipped
    }
}

fn add_row(sheet: &mut Sheet, row_index: usize, values: Option<&[CellValue]>) -> Applied {
    let row = match values {
        Some(values) => values.to_vec(),
        None => vec![CellValue::Empty; sheet.first_row_width()],
    };
    let at = row_index.min(sheet.rows.len());
    sheet.rows.insert(at, row);
    Applied::Changed
}

fn delete_row(sheet: &mut Sheet, row_index: usize) -> Applied {
    if row_index < sheet.rows.len() {
        sheet.rows.remove(row_index);
        Applied::Changed
    } else {
        Applied::Skipped
    }
}

fn add_column(sheet: &mut Sheet, col_index: usize, values: &[CellValue]) -> Applied {
    for (i, row) in sheet.rows.iter_mut().enumerate() {
        // Rows shorter than the insertion point already read as empty there.
        if col_index <= row.len() {
            row.insert(col_index, values.get(i).cloned().unwrap_or_default());
        }
    }
    Applied::Changed
}

fn delete_column(sheet: &mut Sheet, col_index: usize) -> Applied {
    let mut removed = false;
    for row in &mut sheet.rows {
        if col_index < row.len() {
            row.remove(col_index);
            removed = true;
        }
    }
    if removed {
        Applied::Changed
    } else {
        Applied::Skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_sheet(rows: usize, cols: usize) -> Document {
        let rows = (0..rows)
            .map(|r| {
                (0..cols)
                    .map(|c| CellValue::Number((r * 10 + c) as f64))
                    .collect()
            })
            .collect();
        Document::new("t.xlsx", vec![Sheet::new("Sheet1", rows)])
    }

    #[test]
    fn test_delete_row_shifts_following_rows_up() {
        let mut doc = numbered_sheet(5, 2);
        let former_row_4 = doc.sheets[0].rows[4].clone();

        let applied = apply(&mut doc, &Operation::DeleteRow { sheet_index: 0, row_index: 3 });

        assert_eq!(applied, Applied::Changed);
        assert_eq!(doc.sheets[0].rows.len(), 4);
        assert_eq!(doc.sheets[0].rows[3], former_row_4);
    }

    #[test]
    fn test_add_column_grows_every_row_by_one_empty_cell() {
        let mut doc = numbered_sheet(3, 3);

        let applied = apply(
            &mut doc,
            &Operation::AddColumn { sheet_index: 0, col_index: 1, values: vec![] },
        );

        assert_eq!(applied, Applied::Changed);
        for (r, row) in doc.sheets[0].rows.iter().enumerate() {
            assert_eq!(row.len(), 4);
            assert_eq!(row[1], CellValue::Empty);
            assert_eq!(row[2], CellValue::Number((r * 10 + 1) as f64));
        }
    }

    #[test]
    fn test_add_column_restores_values() {
        let mut doc = numbered_sheet(2, 2);
        let values = vec![CellValue::text("a"), CellValue::text("b")];
        apply(&mut doc, &Operation::AddColumn { sheet_index: 0, col_index: 2, values });
        assert_eq!(doc.sheets[0].column(2), vec![CellValue::text("a"), CellValue::text("b")]);
    }

    #[test]
    fn test_add_row_uses_first_row_width() {
        let mut doc = numbered_sheet(2, 3);
        apply(&mut doc, &Operation::AddRow { sheet_index: 0, row_index: 1, values: None });
        assert_eq!(doc.sheets[0].rows.len(), 3);
        assert_eq!(doc.sheets[0].rows[1], vec![CellValue::Empty; 3]);
        assert_eq!(doc.sheets[0].rows[2][0], CellValue::Number(10.0));
    }

    #[test]
    fn test_add_row_on_empty_sheet_and_past_end() {
        let mut doc = Document::new("t.xlsx", vec![Sheet::new("S", vec![])]);
        apply(&mut doc, &Operation::AddRow { sheet_index: 0, row_index: 9, values: None });
        assert_eq!(doc.sheets[0].rows, vec![Vec::<CellValue>::new()]);
    }

    #[test]
    fn test_add_row_restores_deleted_contents() {
        let mut doc = numbered_sheet(3, 2);
        let deleted = doc.sheets[0].rows[1].clone();
        apply(&mut doc, &Operation::DeleteRow { sheet_index: 0, row_index: 1 });
        apply(
            &mut doc,
            &Operation::AddRow { sheet_index: 0, row_index: 1, values: Some(deleted.clone()) },
        );
        assert_eq!(doc.sheets[0].rows[1], deleted);
        assert_eq!(doc, numbered_sheet(3, 2));
    }

    #[test]
    fn test_delete_column_tolerates_short_rows() {
        let mut doc = Document::new(
            "t.xlsx",
            vec![Sheet::new(
                "S",
                vec![
                    vec![CellValue::Number(1.0), CellValue::Number(2.0), CellValue::Number(3.0)],
                    vec![CellValue::Number(4.0)],
                ],
            )],
        );
        apply(&mut doc, &Operation::DeleteColumn { sheet_index: 0, col_index: 1 });
        assert_eq!(doc.sheets[0].rows[0], vec![CellValue::Number(1.0), CellValue::Number(3.0)]);
        assert_eq!(doc.sheets[0].rows[1], vec![CellValue::Number(4.0)]);
    }

    #[test]
    fn test_set_cell_missing_row_is_noop() {
        let mut doc = numbered_sheet(2, 2);
        let before = doc.clone();
        let op = Operation::SetCell {
            sheet_index: 0,
            cell: CellChange::new(9, 0, CellValue::text("x")),
        };
        assert_eq!(apply(&mut doc, &op), Applied::Skipped);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_set_cell_is_idempotent() {
        let mut doc = numbered_sheet(2, 2);
        let op = Operation::SetCell {
            sheet_index: 0,
            cell: CellChange::new(1, 1, CellValue::text("x")),
        };
        apply(&mut doc, &op);
        let once = doc.clone();
        apply(&mut doc, &op);
        assert_eq!(doc, once);
    }

    #[test]
    fn test_missing_sheet_is_silent_noop() {
        let mut doc = numbered_sheet(2, 2);
        let before = doc.clone();
        assert_eq!(
            apply(&mut doc, &Operation::DeleteRow { sheet_index: 7, row_index: 0 }),
            Applied::Skipped
        );
        assert_eq!(doc, before);
    }

    #[test]
    fn test_sheet_ops_request_refresh() {
        let mut doc = numbered_sheet(1, 1);
        let before = doc.clone();
        let op = Operation::AddSheet { sheet_index: 1, name: "Sheet2".into() };
        assert_eq!(apply(&mut doc, &op), Applied::NeedsRefresh);
        assert_eq!(apply(&mut doc, &Operation::DeleteSheet { sheet_index: 0 }), Applied::NeedsRefresh);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_batch_applies_each_change() {
        let mut doc = numbered_sheet(2, 2);
        let op = Operation::Batch {
            sheet_index: 0,
            cells: vec![
                CellChange::new(0, 0, CellValue::text("a")),
                CellChange::new(1, 1, CellValue::Boolean(true)),
                CellChange::new(5, 5, CellValue::text("ignored")),
            ],
        };
        assert_eq!(apply(&mut doc, &op), Applied::Changed);
        assert_eq!(doc.sheets[0].cell(0, 0), &CellValue::text("a"));
        assert_eq!(doc.sheets[0].cell(1, 1), &CellValue::Boolean(true));
        assert_eq!(doc.sheets[0].rows.len(), 2);
    }
}
