//! Recorded commands: each carries enough data to build its own inverse.

use sheetsync_core::{CellChange, CellValue, Document, Operation, Result, Sheet, SheetError};

/// One cell write with its previous value.
#[derive(Clone, Debug, PartialEq)]
pub struct CellEdit {
    pub row: usize,
    pub col: usize,
    pub old_value: CellValue,
    pub new_value: CellValue,
}

impl CellEdit {
    pub fn new(row: usize, col: usize, old_value: CellValue, new_value: CellValue) -> Self {
        Self {
            row,
            col,
            old_value,
            new_value,
        }
    }
}

/// A mutation as stored in the history.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    SetCell { sheet: usize, edit: CellEdit },
    SetCells { sheet: usize, edits: Vec<CellEdit> },
    /// `values: None` inserts a fresh row as wide as the first row.
    InsertRow { sheet: usize, row: usize, values: Option<Vec<CellValue>> },
    RemoveRow { sheet: usize, row: usize, values: Vec<CellValue> },
    InsertColumn { sheet: usize, col: usize, values: Vec<CellValue> },
    RemoveColumn { sheet: usize, col: usize, values: Vec<CellValue> },
    InsertSheet { index: usize, sheet: Sheet },
    RemoveSheet { index: usize, sheet: Sheet },
}

fn sheet_mut(document: &mut Document, index: usize) -> Result<&mut Sheet> {
    document
        .sheet_mut(index)
        .ok_or(SheetError::SheetOutOfRange(index))
}

impl Command {
    /// Sheet whose cells or rows this command touches.
    pub fn sheet(&self) -> usize {
        match self {
            Command::SetCell { sheet, .. }
            | Command::SetCells { sheet, .. }
            | Command::InsertRow { sheet, .. }
            | Command::RemoveRow { sheet, .. }
            | Command::InsertColumn { sheet, .. }
            | Command::RemoveColumn { sheet, .. } => *sheet,
            Command::InsertSheet { index, .. } | Command::RemoveSheet { index, .. } => *index,
        }
    }

    /// Replace client-supplied inverse data with what the document actually holds.
    pub fn capture(self, document: &Document) -> Result<Command> {
        let sheet_of = move |index: usize| {
            document
                .sheet(index)
                .ok_or(SheetError::SheetOutOfRange(index))
        };
        Ok(match self {
            Command::SetCell { sheet, edit } => {
                let real_old = sheet_of(sheet)?.cell(edit.row, edit.col).clone();
                if real_old != edit.old_value {
                    log::debug!(
                        "set cell ({}, {}): client old value {:?} replaced by {:?}",
                        edit.row,
                        edit.col,
                        edit.old_value,
                        real_old
                    );
                }
                Command::SetCell {
                    sheet,
                    edit: CellEdit::new(edit.row, edit.col, real_old, edit.new_value),
                }
            }
            Command::SetCells { sheet, edits } => {
                let s = sheet_of(sheet)?;
                let edits = edits
                    .into_iter()
                    .map(|e| {
                        let real_old = s.cell(e.row, e.col).clone();
                        CellEdit::new(e.row, e.col, real_old, e.new_value)
                    })
                    .collect();
                Command::SetCells { sheet, edits }
            }
            Command::RemoveRow { sheet, row, .. } => {
                let values = sheet_of(sheet)?
                    .rows
                    .get(row)
                    .cloned()
                    .ok_or(SheetError::RowOutOfRange { sheet, row })?;
                Command::RemoveRow { sheet, row, values }
            }
            Command::RemoveColumn { sheet, col, .. } => {
                let values = sheet_of(sheet)?.column(col);
                Command::RemoveColumn { sheet, col, values }
            }
            Command::RemoveSheet { index, .. } => {
                let sheet = sheet_of(index)?.clone();
                Command::RemoveSheet { index, sheet }
            }
            other => other,
        })
    }

    /// True when executing would not change anything worth recording.
    pub fn is_noop(&self) -> bool {
        match self {
            Command::SetCell { edit, .. } => edit.old_value == edit.new_value,
            Command::SetCells { edits, .. } => edits.iter().all(|e| e.old_value == e.new_value),
            _ => false,
        }
    }

    /// Apply to the document and describe the result for the client.
    pub fn execute(&self, document: &mut Document) -> Result<Operation> {
        match self {
            Command::SetCell { sheet, edit } => {
                let s = sheet_mut(document, *sheet)?;
                if !s.set(edit.row, edit.col, edit.new_value.clone()) {
                    return Err(SheetError::RowOutOfRange {
                        sheet: *sheet,
                        row: edit.row,
                    });
                }
                Ok(Operation::SetCell {
                    sheet_index: *sheet,
                    cell: CellChange::new(edit.row, edit.col, edit.new_value.clone()),
                })
            }
            Command::SetCells { sheet, edits } => {
                let s = sheet_mut(document, *sheet)?;
                if let Some(bad) = edits.iter().find(|e| e.row >= s.row_count()) {
                    return Err(SheetError::RowOutOfRange {
                        sheet: *sheet,
                        row: bad.row,
                    });
                }
                let mut cells = Vec::with_capacity(edits.len());
                for edit in edits {
                    s.set(edit.row, edit.col, edit.new_value.clone());
                    cells.push(CellChange::new(edit.row, edit.col, edit.new_value.clone()));
                }
                Ok(Operation::Batch {
                    sheet_index: *sheet,
                    cells,
                })
            }
            Command::InsertRow { sheet, row, values } => {
                let s = sheet_mut(document, *sheet)?;
                if *row > s.row_count() {
                    return Err(SheetError::RowOutOfRange {
                        sheet: *sheet,
                        row: *row,
                    });
                }
                let inserted = match values {
                    Some(values) => values.clone(),
                    None => vec![CellValue::Empty; s.first_row_width()],
                };
                s.rows.insert(*row, inserted.clone());
                Ok(Operation::AddRow {
                    sheet_index: *sheet,
                    row_index: *row,
                    values: Some(inserted),
                })
            }
            Command::RemoveRow { sheet, row, .. } => {
                let s = sheet_mut(document, *sheet)?;
                if *row >= s.row_count() {
                    return Err(SheetError::RowOutOfRange {
                        sheet: *sheet,
                        row: *row,
                    });
                }
                s.rows.remove(*row);
                Ok(Operation::DeleteRow {
                    sheet_index: *sheet,
                    row_index: *row,
                })
            }
            Command::InsertColumn { sheet, col, values } => {
                let s = sheet_mut(document, *sheet)?;
                if *col > s.column_count() {
                    return Err(SheetError::ColumnOutOfRange {
                        sheet: *sheet,
                        col: *col,
                    });
                }
                let mut inserted = Vec::with_capacity(s.row_count());
                for (i, row) in s.rows.iter_mut().enumerate() {
                    let value = values.get(i).cloned().unwrap_or_default();
                    if *col <= row.len() {
                        row.insert(*col, value.clone());
                    }
                    inserted.push(value);
                }
                Ok(Operation::AddColumn {
                    sheet_index: *sheet,
                    col_index: *col,
                    values: inserted,
                })
            }
            Command::RemoveColumn { sheet, col, .. } => {
                let s = sheet_mut(document, *sheet)?;
                if *col >= s.column_count() {
                    return Err(SheetError::ColumnOutOfRange {
                        sheet: *sheet,
                        col: *col,
                    });
                }
                for row in &mut s.rows {
                    if *col < row.len() {
                        row.remove(*col);
                    }
                }
                Ok(Operation::DeleteColumn {
                    sheet_index: *sheet,
                    col_index: *col,
                })
            }
            Command::InsertSheet { index, sheet } => {
                if *index > document.sheets.len() {
                    return Err(SheetError::SheetOutOfRange(*index));
                }
                document.sheets.insert(*index, sheet.clone());
                Ok(Operation::AddSheet {
                    sheet_index: *index,
                    name: sheet.name.clone(),
                })
            }
            Command::RemoveSheet { index, .. } => {
                if *index >= document.sheets.len() {
                    return Err(SheetError::SheetOutOfRange(*index));
                }
                if document.sheets.len() <= 1 {
                    return Err(SheetError::LastSheet);
                }
                document.sheets.remove(*index);
                Ok(Operation::DeleteSheet {
                    sheet_index: (*index).min(document.sheets.len() - 1),
                })
            }
        }
    }

    /// The command that undoes this one.
    pub fn inverse(&self) -> Command {
        match self {
            Command::SetCell { sheet, edit } => Command::SetCell {
                sheet: *sheet,
                edit: CellEdit::new(
                    edit.row,
                    edit.col,
                    edit.new_value.clone(),
                    edit.old_value.clone(),
                ),
            },
            Command::SetCells { sheet, edits } => Command::SetCells {
                sheet: *sheet,
                edits: edits
                    .iter()
                    .rev()
                    .map(|e| CellEdit::new(e.row, e.col, e.new_value.clone(), e.old_value.clone()))
                    .collect(),
            },
            Command::InsertRow { sheet, row, values } => Command::RemoveRow {
                sheet: *sheet,
                row: *row,
                values: values.clone().unwrap_or_default(),
            },
            Command::RemoveRow { sheet, row, values } => Command::InsertRow {
                sheet: *sheet,
                row: *row,
                values: Some(values.clone()),
            },
            Command::InsertColumn { sheet, col, values } => Command::RemoveColumn {
                sheet: *sheet,
                col: *col,
                values: values.clone(),
            },
            Command::RemoveColumn { sheet, col, values } => Command::InsertColumn {
                sheet: *sheet,
                col: *col,
                values: values.clone(),
            },
            Command::InsertSheet { index, sheet } => Command::RemoveSheet {
                index: *index,
                sheet: sheet.clone(),
            },
            Command::RemoveSheet { index, sheet } => Command::InsertSheet {
                index: *index,
                sheet: sheet.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::new(
            "t.xlsx",
            vec![Sheet::new(
                "Sheet1",
                vec![
                    vec![CellValue::Number(1.0), CellValue::Number(2.0)],
                    vec![CellValue::Number(3.0), CellValue::Number(4.0)],
                ],
            )],
        )
    }

    #[test]
    fn test_capture_uses_real_old_value() {
        let d = doc();
        let cmd = Command::SetCell {
            sheet: 0,
            edit: CellEdit::new(0, 1, CellValue::text("stale"), CellValue::text("new")),
        };
        let captured = cmd.capture(&d).unwrap();
        match captured {
            Command::SetCell { edit, .. } => assert_eq!(edit.old_value, CellValue::Number(2.0)),
            _ => panic!("Expected SetCell"),
        }
    }

    #[test]
    fn test_remove_row_captures_contents_and_inverts() {
        let mut d = doc();
        let original = d.clone();
        let cmd = Command::RemoveRow { sheet: 0, row: 0, values: vec![] }
            .capture(&d)
            .unwrap();
        cmd.execute(&mut d).unwrap();
        assert_eq!(d.sheets[0].rows.len(), 1);

        let op = cmd.inverse().execute(&mut d).unwrap();
        assert_eq!(d, original);
        assert_eq!(
            op,
            Operation::AddRow {
                sheet_index: 0,
                row_index: 0,
                values: Some(vec![CellValue::Number(1.0), CellValue::Number(2.0)]),
            }
        );
    }

    #[test]
    fn test_undo_remove_zero_length_row_is_lossless() {
        let mut d = doc();
        d.sheets[0].rows.insert(1, Vec::new());
        let original = d.clone();
        let cmd = Command::RemoveRow { sheet: 0, row: 1, values: vec![] }
            .capture(&d)
            .unwrap();
        cmd.execute(&mut d).unwrap();

        let op = cmd.inverse().execute(&mut d).unwrap();
        assert_eq!(d, original);
        assert!(d.sheets[0].rows[1].is_empty());
        assert_eq!(
            op,
            Operation::AddRow { sheet_index: 0, row_index: 1, values: Some(vec![]) }
        );
    }

    #[test]
    fn test_insert_fresh_row_uses_first_row_width() {
        let mut d = doc();
        let op = Command::InsertRow { sheet: 0, row: 2, values: None }
            .execute(&mut d)
            .unwrap();
        assert_eq!(d.sheets[0].rows[2], vec![CellValue::Empty; 2]);
        assert_eq!(
            op,
            Operation::AddRow {
                sheet_index: 0,
                row_index: 2,
                values: Some(vec![CellValue::Empty; 2]),
            }
        );
    }

    #[test]
    fn test_remove_column_round_trip() {
        let mut d = doc();
        let original = d.clone();
        let cmd = Command::RemoveColumn { sheet: 0, col: 0, values: vec![] }
            .capture(&d)
            .unwrap();
        cmd.execute(&mut d).unwrap();
        assert_eq!(d.sheets[0].rows[0], vec![CellValue::Number(2.0)]);
        cmd.inverse().execute(&mut d).unwrap();
        assert_eq!(d, original);
    }

    #[test]
    fn test_remove_last_sheet_rejected() {
        let mut d = doc();
        let cmd = Command::RemoveSheet { index: 0, sheet: Sheet::default() };
        assert!(matches!(cmd.execute(&mut d), Err(SheetError::LastSheet)));
    }

    #[test]
    fn test_remove_sheet_reports_next_active_index() {
        let mut d = doc();
        d.sheets.push(Sheet::blank("Sheet2"));
        let op = Command::RemoveSheet { index: 1, sheet: Sheet::default() }
            .execute(&mut d)
            .unwrap();
        assert_eq!(op, Operation::DeleteSheet { sheet_index: 0 });
    }

    #[test]
    fn test_out_of_range_row_is_error() {
        let mut d = doc();
        let cmd = Command::InsertRow { sheet: 0, row: 5, values: None };
        assert!(matches!(
            cmd.execute(&mut d),
            Err(SheetError::RowOutOfRange { sheet: 0, row: 5 })
        ));
        let cmd = Command::SetCell {
            sheet: 3,
            edit: CellEdit::new(0, 0, CellValue::Empty, CellValue::Empty),
        };
        assert!(matches!(cmd.execute(&mut d), Err(SheetError::SheetOutOfRange(3))));
    }

    #[test]
    fn test_noop_detection() {
        let same = Command::SetCell {
            sheet: 0,
            edit: CellEdit::new(0, 0, CellValue::Number(1.0), CellValue::Number(1.0)),
        };
        assert!(same.is_noop());
        assert!(!Command::InsertRow { sheet: 0, row: 0, values: None }.is_noop());
    }
}
