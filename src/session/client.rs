//! Operation log client: the session's only path to the backend.

use sheetsync_core::{CellValue, Document, Operation, Result};
use sheetsync_engine::{Backend, CellEdit, EditorFlags, SearchMatch, SearchScope};
use std::cell::Cell;
use std::path::Path;

/// Sets a loading flag for its lifetime and clears it on drop, including
/// when the guarded call returns early with an error.
pub struct LoadingGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> LoadingGuard<'a> {
    pub fn new(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

pub struct OperationClient<B: Backend> {
    backend: B,
    flags: EditorFlags,
    loading: Cell<bool>,
}

impl<B: Backend> OperationClient<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            flags: EditorFlags::default(),
            loading: Cell::new(false),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Undo/redo availability as last reported by the backend.
    pub fn flags(&self) -> EditorFlags {
        self.flags
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    fn call<T>(&mut self, f: impl FnOnce(&mut B) -> Result<T>) -> Result<T> {
        let _guard = LoadingGuard::new(&self.loading);
        f(&mut self.backend)
    }

    /// Run a mutating call, then refresh the undo/redo flags from the backend.
    fn mutate<T>(&mut self, f: impl FnOnce(&mut B) -> Result<T>) -> Result<T> {
        let result = self.call(f)?;
        self.refresh_flags();
        Ok(result)
    }

    fn refresh_flags(&mut self) {
        match self.backend.editor_state() {
            Ok(flags) => self.flags = flags,
            Err(e) => log::warn!("failed to refresh editor state: {}", e),
        }
    }

    pub fn read_file(&mut self, path: &Path) -> Result<Document> {
        self.mutate(|b| b.read_file(path))
    }

    pub fn create(&mut self) -> Result<Document> {
        self.mutate(|b| b.create())
    }

    pub fn save_file(&mut self, path: &Path, document: &Document) -> Result<()> {
        self.call(|b| b.save_file(path, document))
    }

    pub fn fetch_document(&mut self) -> Result<Document> {
        self.call(|b| b.fetch_document())
    }

    pub fn set_cell(
        &mut self,
        sheet: usize,
        row: usize,
        col: usize,
        old_value: CellValue,
        new_value: CellValue,
    ) -> Result<Operation> {
        self.mutate(|b| b.set_cell(sheet, row, col, old_value, new_value))
    }

    pub fn set_cells(&mut self, sheet: usize, edits: Vec<CellEdit>) -> Result<Operation> {
        self.mutate(|b| b.set_cells(sheet, edits))
    }

    pub fn add_row(&mut self, sheet: usize, row: usize) -> Result<Operation> {
        self.mutate(|b| b.add_row(sheet, row))
    }

    pub fn delete_row(
        &mut self,
        sheet: usize,
        row: usize,
        contents: Vec<CellValue>,
    ) -> Result<Operation> {
        self.mutate(|b| b.delete_row(sheet, row, contents))
    }

    pub fn add_column(&mut self, sheet: usize, col: usize) -> Result<Operation> {
        self.mutate(|b| b.add_column(sheet, col))
    }

    pub fn delete_column(
        &mut self,
        sheet: usize,
        col: usize,
        contents: Vec<CellValue>,
    ) -> Result<Operation> {
        self.mutate(|b| b.delete_column(sheet, col, contents))
    }

    pub fn add_sheet(&mut self) -> Result<Operation> {
        self.mutate(|b| b.add_sheet())
    }

    pub fn delete_sheet(&mut self, sheet: usize) -> Result<Operation> {
        self.mutate(|b| b.delete_sheet(sheet))
    }

    pub fn undo(&mut self) -> Result<Operation> {
        self.mutate(|b| b.undo())
    }

    pub fn redo(&mut self) -> Result<Operation> {
        self.mutate(|b| b.redo())
    }

    pub fn search(
        &mut self,
        query: &str,
        scope: SearchScope,
        current: Option<usize>,
    ) -> Result<Vec<SearchMatch>> {
        self.call(|b| b.search(query, scope, current))
    }

    pub fn close(&mut self) {
        self.backend.close();
        self.flags = EditorFlags::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetsync_core::SheetError;
    use sheetsync_engine::LocalBackend;

    #[test]
    fn test_guard_resets_flag_on_drop() {
        let flag = Cell::new(false);
        {
            let _guard = LoadingGuard::new(&flag);
            assert!(flag.get());
        }
        assert!(!flag.get());
    }

    #[test]
    fn test_failed_call_releases_loading() {
        let mut client = OperationClient::new(LocalBackend::new());
        let err = client.undo().unwrap_err();
        assert!(matches!(err, SheetError::NoDocument));
        assert!(!client.is_loading());
    }

    #[test]
    fn test_flags_follow_backend() {
        let mut client = OperationClient::new(LocalBackend::new());
        client.create().unwrap();
        assert_eq!(client.flags(), EditorFlags::default());

        client
            .set_cell(0, 0, 0, CellValue::Empty, CellValue::text("x"))
            .unwrap();
        assert!(client.flags().can_undo);

        client.undo().unwrap();
        assert_eq!(
            client.flags(),
            EditorFlags { can_undo: false, can_redo: true }
        );

        client.close();
        assert_eq!(client.flags(), EditorFlags::default());
    }

    #[test]
    fn test_failed_mutation_keeps_flags() {
        let mut client = OperationClient::new(LocalBackend::new());
        client.create().unwrap();
        client
            .set_cell(0, 0, 0, CellValue::Empty, CellValue::text("x"))
            .unwrap();
        assert!(client.delete_row(0, 99, Vec::new()).is_err());
        assert!(client.flags().can_undo);
    }
}
