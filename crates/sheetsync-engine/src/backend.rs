//! The backend command surface and its in-process implementation.

use crate::command::{CellEdit, Command};
use crate::history::History;
use crate::search::{SearchIndex, SearchMatch, SearchScope};
use serde::{Deserialize, Serialize};
use sheetsync_core::storage;
use sheetsync_core::{CellValue, Document, Operation, Result, Sheet, SheetError};
use std::path::Path;

/// Undo/redo availability as reported by the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorFlags {
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Commands the editing core sends to whatever owns the authoritative workbook.
///
/// Every mutation returns the [`Operation`] that was applied so the caller
/// can replay it against its mirror. Delete calls carry the contents being
/// removed and `set_cell` carries the previous value; a backend may replace
/// these with what it actually holds.
pub trait Backend {
    fn read_file(&mut self, path: &Path) -> Result<Document>;
    /// Start an empty, untitled workbook.
    fn create(&mut self) -> Result<Document>;
    fn save_file(&mut self, path: &Path, document: &Document) -> Result<()>;
    /// Authoritative copy of the whole workbook.
    fn fetch_document(&self) -> Result<Document>;

    fn set_cell(
        &mut self,
        sheet: usize,
        row: usize,
        col: usize,
        old_value: CellValue,
        new_value: CellValue,
    ) -> Result<Operation>;
    fn set_cells(&mut self, sheet: usize, edits: Vec<CellEdit>) -> Result<Operation>;
    fn add_row(&mut self, sheet: usize, row: usize) -> Result<Operation>;
    fn delete_row(&mut self, sheet: usize, row: usize, contents: Vec<CellValue>)
    -> Result<Operation>;
    fn add_column(&mut self, sheet: usize, col: usize) -> Result<Operation>;
    fn delete_column(
        &mut self,
        sheet: usize,
        col: usize,
        contents: Vec<CellValue>,
    ) -> Result<Operation>;
    fn add_sheet(&mut self) -> Result<Operation>;
    fn delete_sheet(&mut self, sheet: usize) -> Result<Operation>;
    fn undo(&mut self) -> Result<Operation>;
    fn redo(&mut self) -> Result<Operation>;

    fn editor_state(&self) -> Result<EditorFlags>;
    fn search(
        &mut self,
        query: &str,
        scope: SearchScope,
        current: Option<usize>,
    ) -> Result<Vec<SearchMatch>>;
    /// Drop the open workbook and its history.
    fn close(&mut self);
}

/// Backend that keeps the workbook and its history in this process.
#[derive(Debug, Default)]
pub struct LocalBackend {
    state: Option<History>,
    index: SearchIndex,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    fn history(&self) -> Result<&History> {
        self.state.as_ref().ok_or(SheetError::NoDocument)
    }

    fn history_mut(&mut self) -> Result<&mut History> {
        self.state.as_mut().ok_or(SheetError::NoDocument)
    }

    fn open(&mut self, document: Document) -> Document {
        self.index.invalidate_all();
        self.state = Some(History::new(document.clone()));
        document
    }

    fn applied(&mut self, operation: Operation) -> Operation {
        if operation.is_sheet_level() {
            self.index.invalidate_all();
        } else {
            self.index.invalidate(operation.sheet_index());
        }
        log::debug!("backend applied: {}", operation.describe());
        operation
    }

    fn run(&mut self, command: Command) -> Result<Operation> {
        let operation = self.history_mut()?.execute(command)?;
        Ok(self.applied(operation))
    }
}

impl Backend for LocalBackend {
    fn read_file(&mut self, path: &Path) -> Result<Document> {
        let document = storage::read_file(path)?;
        log::info!(
            "opened {} ({} sheet(s))",
            path.display(),
            document.sheets.len()
        );
        Ok(self.open(document))
    }

    fn create(&mut self) -> Result<Document> {
        Ok(self.open(Document::untitled()))
    }

    fn save_file(&mut self, path: &Path, document: &Document) -> Result<()> {
        storage::save_file(path, document)?;
        if let Some(history) = self.state.as_mut() {
            history.document.file_name = storage::file_name_of(path);
        }
        log::info!("saved {}", path.display());
        Ok(())
    }

    fn fetch_document(&self) -> Result<Document> {
        Ok(self.history()?.document.clone())
    }

    fn set_cell(
        &mut self,
        sheet: usize,
        row: usize,
        col: usize,
        old_value: CellValue,
        new_value: CellValue,
    ) -> Result<Operation> {
        self.run(Command::SetCell {
            sheet,
            edit: CellEdit::new(row, col, old_value, new_value),
        })
    }

    fn set_cells(&mut self, sheet: usize, edits: Vec<CellEdit>) -> Result<Operation> {
        self.run(Command::SetCells { sheet, edits })
    }

    fn add_row(&mut self, sheet: usize, row: usize) -> Result<Operation> {
        self.run(Command::InsertRow {
            sheet,
            row,
            values: None,
        })
    }

    fn delete_row(
        &mut self,
        sheet: usize,
        row: usize,
        contents: Vec<CellValue>,
    ) -> Result<Operation> {
        self.run(Command::RemoveRow {
            sheet,
            row,
            values: contents,
        })
    }

    fn add_column(&mut self, sheet: usize, col: usize) -> Result<Operation> {
        self.run(Command::InsertColumn {
            sheet,
            col,
            values: Vec::new(),
        })
    }

    fn delete_column(
        &mut self,
        sheet: usize,
        col: usize,
        contents: Vec<CellValue>,
    ) -> Result<Operation> {
        self.run(Command::RemoveColumn {
            sheet,
            col,
            values: contents,
        })
    }

    fn add_sheet(&mut self) -> Result<Operation> {
        let document = &self.history()?.document;
        let index = document.sheets.len();
        let sheet = Sheet::blank(document.next_sheet_name());
        self.run(Command::InsertSheet { index, sheet })
    }

    fn delete_sheet(&mut self, sheet: usize) -> Result<Operation> {
        self.run(Command::RemoveSheet {
            index: sheet,
            sheet: Sheet::default(),
        })
    }

    fn undo(&mut self) -> Result<Operation> {
        let operation = self.history_mut()?.undo()?;
        Ok(self.applied(operation))
    }

    fn redo(&mut self) -> Result<Operation> {
        let operation = self.history_mut()?.redo()?;
        Ok(self.applied(operation))
    }

    fn editor_state(&self) -> Result<EditorFlags> {
        Ok(self.history()?.flags())
    }

    fn search(
        &mut self,
        query: &str,
        scope: SearchScope,
        current: Option<usize>,
    ) -> Result<Vec<SearchMatch>> {
        let history = self.state.as_ref().ok_or(SheetError::NoDocument)?;
        Ok(self.index.search(&history.document, query, scope, current))
    }

    fn close(&mut self) {
        self.state = None;
        self.index.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> LocalBackend {
        let mut backend = LocalBackend::new();
        backend.create().unwrap();
        backend
    }

    #[test]
    fn test_no_document_errors() {
        let mut backend = LocalBackend::new();
        assert!(matches!(backend.fetch_document(), Err(SheetError::NoDocument)));
        assert!(matches!(backend.undo(), Err(SheetError::NoDocument)));
        assert!(matches!(backend.editor_state(), Err(SheetError::NoDocument)));
        assert!(matches!(
            backend.search("x", SearchScope::AllSheets, None),
            Err(SheetError::NoDocument)
        ));
    }

    #[test]
    fn test_set_cell_then_undo_updates_flags() {
        let mut backend = loaded();
        backend
            .set_cell(0, 1, 1, CellValue::Empty, CellValue::Number(7.0))
            .unwrap();
        assert_eq!(
            backend.editor_state().unwrap(),
            EditorFlags { can_undo: true, can_redo: false }
        );

        let op = backend.undo().unwrap();
        assert_eq!(op.sheet_index(), 0);
        assert_eq!(
            backend.editor_state().unwrap(),
            EditorFlags { can_undo: false, can_redo: true }
        );
        assert!(backend.fetch_document().unwrap().sheets[0].is_blank());
    }

    #[test]
    fn test_add_sheet_names_and_appends() {
        let mut backend = loaded();
        let op = backend.add_sheet().unwrap();
        assert_eq!(op, Operation::AddSheet { sheet_index: 1, name: "Sheet2".into() });
        let doc = backend.fetch_document().unwrap();
        assert_eq!(doc.sheets.len(), 2);
        assert_eq!(doc.sheets[1].row_count(), 5);
        assert_eq!(doc.sheets[1].column_count(), 5);
    }

    #[test]
    fn test_delete_last_sheet_refused() {
        let mut backend = loaded();
        assert!(matches!(backend.delete_sheet(0), Err(SheetError::LastSheet)));
        assert!(!backend.editor_state().unwrap().can_undo);
    }

    #[test]
    fn test_delete_row_ignores_stale_contents() {
        let mut backend = loaded();
        backend
            .set_cell(0, 2, 0, CellValue::Empty, CellValue::text("keep"))
            .unwrap();
        backend
            .delete_row(0, 2, vec![CellValue::text("wrong")])
            .unwrap();
        let op = backend.undo().unwrap();
        match op {
            Operation::AddRow { row_index, values: Some(values), .. } => {
                assert_eq!(row_index, 2);
                assert_eq!(values[0], CellValue::text("keep"));
            }
            other => panic!("Expected AddRow, got {:?}", other),
        }
    }

    #[test]
    fn test_search_sees_edits() {
        let mut backend = loaded();
        assert!(backend.search("42", SearchScope::AllSheets, None).unwrap().is_empty());
        backend
            .set_cell(0, 0, 0, CellValue::Empty, CellValue::Number(42.0))
            .unwrap();
        let hits = backend.search("42", SearchScope::AllSheets, None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].position, "A1");

        backend.undo().unwrap();
        assert!(backend.search("42", SearchScope::AllSheets, None).unwrap().is_empty());
    }

    #[test]
    fn test_read_and_save_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("people.csv");
        std::fs::write(&input, "name,age\nAda,36\n").unwrap();

        let mut backend = LocalBackend::new();
        let doc = backend.read_file(&input).unwrap();
        assert_eq!(doc.file_name, "people.csv");
        assert_eq!(doc.sheets[0].cell(1, 1), &CellValue::Number(36.0));

        backend
            .set_cell(0, 1, 1, CellValue::Number(36.0), CellValue::Number(37.0))
            .unwrap();
        let output = dir.path().join("people_edited.csv");
        let current = backend.fetch_document().unwrap();
        backend.save_file(&output, &current).unwrap();
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "name,age\nAda,37\n"
        );
        assert_eq!(backend.fetch_document().unwrap().file_name, "people_edited.csv");
    }

    #[test]
    fn test_close_drops_document() {
        let mut backend = loaded();
        assert!(backend.is_open());
        backend.close();
        assert!(!backend.is_open());
        assert!(matches!(backend.redo(), Err(SheetError::NoDocument)));
    }
}
