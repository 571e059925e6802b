//! The editing session: one open workbook and everything synchronized
//! around it.
//!
//! A [`Session`] owns the local mirror of the workbook and keeps it in step
//! with user edits and with the backend:
//!
//! - grid and editor-bar edits write the mirror immediately and are
//!   persisted later by the debounce scheduler; their backend results are
//!   not replayed
//! - structural edits, paste, undo and redo go to the backend first and
//!   the returned [`Operation`] is applied through the reducer
//! - sheet-level results trigger a full refresh from the backend
//!
//! Handlers never return backend errors. Failures are logged and pushed
//! as notifications, and local state is left as it was.

pub mod client;
pub mod edit_buffer;
pub mod notify;
pub mod scheduler;
pub mod search;
pub mod selection;

use crate::dialog;
use client::OperationClient;
use edit_buffer::EditBuffer;
use notify::Notifications;
use scheduler::{CommitScheduler, PendingChange};
use search::SearchPanel;
use selection::{Navigator, ScrollGeometry, ScrollOffset};
use sheetsync_core::{Applied, CellKey, CellValue, Document, Operation, SheetError, value};
use sheetsync_engine::{Backend, CellEdit, EditorFlags, SearchMatch};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub struct Session<B: Backend> {
    document: Document,
    path: Option<PathBuf>,
    active_sheet: usize,
    buffer: EditBuffer,
    bar: String,
    scheduler: CommitScheduler,
    client: OperationClient<B>,
    navigator: Navigator,
    pub search: SearchPanel,
    pub notifications: Notifications,
}

/// Split tab/newline separated clipboard text into rows of cells.
pub fn parse_clipboard(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}

/// Index of the sheet present in `before` but missing from `after`.
fn removed_sheet_index(before: &[String], after: &Document) -> usize {
    before
        .iter()
        .zip(after.sheets.iter())
        .position(|(name, sheet)| *name != sheet.name)
        .unwrap_or(after.sheets.len())
}

impl<B: Backend> Session<B> {
    fn with_document(client: OperationClient<B>, document: Document, window: Duration) -> Self {
        Self {
            document,
            path: None,
            active_sheet: 0,
            buffer: EditBuffer::new(),
            bar: String::new(),
            scheduler: CommitScheduler::new(window),
            client,
            navigator: Navigator::new(),
            search: SearchPanel::new(),
            notifications: Notifications::default(),
        }
    }

    /// Open `path` through `backend`.
    pub fn open(backend: B, path: &Path, window: Duration) -> sheetsync_core::Result<Self> {
        let mut client = OperationClient::new(backend);
        let document = client.read_file(path)?;
        let mut session = Self::with_document(client, document, window);
        session.path = Some(path.to_path_buf());
        session
            .notifications
            .info(format!("Opened {}", session.document.file_name));
        Ok(session)
    }

    /// Start an untitled workbook.
    pub fn create(backend: B, window: Duration) -> sheetsync_core::Result<Self> {
        let mut client = OperationClient::new(backend);
        let document = client.create()?;
        Ok(Self::with_document(client, document, window))
    }

    // ----- state -----

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn active_sheet(&self) -> usize {
        self.active_sheet
    }

    pub fn selection(&self) -> Option<CellKey> {
        self.navigator.selection()
    }

    /// Text of the single-cell editor bar.
    pub fn bar_text(&self) -> &str {
        &self.bar
    }

    pub fn flags(&self) -> EditorFlags {
        self.client.flags()
    }

    pub fn is_loading(&self) -> bool {
        self.client.is_loading()
    }

    pub fn is_editing(&self, key: CellKey) -> bool {
        self.buffer.is_editing(key)
    }

    pub fn pending(&self) -> &[PendingChange] {
        self.scheduler.pending()
    }

    /// When [`Session::tick`] next has work to do.
    pub fn deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    pub fn client(&self) -> &OperationClient<B> {
        &self.client
    }

    /// Value shown for a cell of the active sheet.
    pub fn display_value(&self, key: CellKey) -> String {
        self.buffer
            .display(key, self.document.cell(self.active_sheet, key))
    }

    /// Consume a pending centering request for the current selection.
    pub fn take_scroll(&mut self, geometry: &ScrollGeometry) -> Option<ScrollOffset> {
        self.navigator.take_scroll(geometry)
    }

    fn report(&mut self, action: &str, err: SheetError) {
        log::warn!("{} failed: {}", action, err);
        self.notifications.error(format!("{} failed: {}", action, err));
    }

    // ----- selection -----

    /// Grid selection. Any cell being edited is committed first.
    pub fn select_cell(&mut self, key: CellKey) {
        self.blur();
        self.navigator.click(key);
        self.bar = self.display_value(key);
    }

    /// Deselect without committing. Uncommitted text and unsent edits are
    /// dropped and the mirror gets the dropped cells' previous values back.
    pub fn clear_selection(&mut self) {
        self.discard_pending();
        self.navigator.clear();
        self.bar.clear();
    }

    /// Commit the edit at the current selection, if there is one.
    fn blur(&mut self) {
        if let Some(key) = self.navigator.selection()
            && self.buffer.is_editing(key)
        {
            self.commit_cell(key);
        }
    }

    // ----- editing -----

    /// Start editing `key`, seeded with what the cell currently shows.
    pub fn begin_edit(&mut self, key: CellKey) {
        if self.navigator.selection() != Some(key) {
            self.select_cell(key);
        }
        if !self.buffer.is_editing(key) {
            let seed = self.display_value(key);
            self.buffer.start_edit(key, seed);
        }
    }

    /// Keystroke in a grid cell: buffer it, write the mirror and schedule
    /// the persist. The editor bar follows when `key` is selected.
    pub fn edit_cell(&mut self, key: CellKey, text: &str, now: Instant) {
        self.buffer.update(key, text.to_string());
        if self.navigator.selection() == Some(key) {
            self.bar = text.to_string();
        }
        self.write_optimistic(key, value::parse(text), now);
    }

    fn write_optimistic(&mut self, key: CellKey, new_value: CellValue, now: Instant) -> bool {
        let sheet = self.active_sheet;
        let original = self.document.cell(sheet, key).clone();
        let written = self
            .document
            .sheet_mut(sheet)
            .is_some_and(|s| s.set(key.row, key.col, new_value.clone()));
        if !written {
            log::debug!("no cell {} on sheet {}; not scheduled", key, sheet);
            return false;
        }
        self.scheduler.schedule(
            PendingChange {
                sheet,
                row: key.row,
                col: key.col,
                original,
                value: new_value,
            },
            now,
        );
        true
    }

    /// Leave edit mode for `key` and persist it now. A cell-change is only
    /// emitted when the text differs from the value before editing began.
    pub fn commit_cell(&mut self, key: CellKey) {
        let Some(text) = self.buffer.commit(key) else {
            return;
        };
        let sheet = self.active_sheet;
        let typed = self
            .scheduler
            .pending()
            .iter()
            .any(|p| p.sheet == sheet && p.key() == key);
        if typed {
            // Already in the mirror; changes back to the original are dropped by `send`.
            self.flush();
            return;
        }
        if text == self.document.formatted(sheet, key) {
            return;
        }
        if self.write_optimistic(key, value::parse(&text), Instant::now()) {
            self.flush();
        } else {
            self.report(
                "Edit",
                SheetError::RowOutOfRange {
                    sheet: self.active_sheet,
                    row: key.row,
                },
            );
        }
    }

    /// Typing in the editor bar edits the selected cell.
    pub fn bar_input(&mut self, text: &str, now: Instant) {
        let Some(key) = self.navigator.selection() else {
            self.bar = text.to_string();
            return;
        };
        if !self.buffer.is_editing(key) {
            self.buffer.start_edit(key, self.bar.clone());
        }
        self.edit_cell(key, text, now);
    }

    pub fn bar_commit(&mut self) {
        if let Some(key) = self.navigator.selection() {
            self.commit_cell(key);
            self.bar = self.display_value(key);
        }
    }

    // ----- persistence -----

    /// Send queued edits whose debounce window has elapsed.
    pub fn tick(&mut self, now: Instant) -> usize {
        self.notifications.expire(now);
        let due = self.scheduler.poll(now);
        let selected = self.navigator.selection();
        for change in &due {
            if Some(change.key()) != selected {
                self.buffer.discard(change.key());
            }
        }
        self.send(due)
    }

    /// Send every queued edit now.
    pub fn flush(&mut self) -> usize {
        let due = self.scheduler.flush();
        self.send(due)
    }

    fn send(&mut self, changes: Vec<PendingChange>) -> usize {
        let mut sent = 0;
        for change in changes {
            if change.value == change.original {
                continue;
            }
            log::debug!(
                "persisting {} on sheet {}",
                change.key(),
                change.sheet
            );
            match self.client.set_cell(
                change.sheet,
                change.row,
                change.col,
                change.original,
                change.value,
            ) {
                Ok(_) => sent += 1,
                Err(e) => self.report("Save cell", e),
            }
        }
        sent
    }

    /// Commit the active edit and flush the queue so indices are stable
    /// before a structural change or exit.
    pub fn settle(&mut self) {
        self.blur();
        self.buffer.clear();
        self.flush();
    }

    // ----- sheets -----

    /// Switch the active sheet. Uncommitted text and unsent edits are
    /// dropped; the mirror gets the dropped cells' previous values back.
    pub fn switch_sheet(&mut self, index: usize) -> bool {
        if index == self.active_sheet || index >= self.document.sheets.len() {
            return false;
        }
        self.navigator.leave_sheet(self.active_sheet);
        self.bar.clear();
        self.discard_pending();
        self.enter_sheet(index);
        true
    }

    /// Drop uncommitted text and unsent edits, restoring their originals.
    fn discard_pending(&mut self) {
        self.buffer.clear();
        for dropped in self.scheduler.abandon() {
            if let Some(sheet) = self.document.sheet_mut(dropped.sheet) {
                sheet.set(dropped.row, dropped.col, dropped.original);
            }
        }
    }

    fn enter_sheet(&mut self, index: usize) {
        self.active_sheet = index.min(self.document.sheets.len().saturating_sub(1));
        match self.navigator.enter_sheet(self.active_sheet) {
            Some(key) => self.bar = self.display_value(key),
            None => self.bar.clear(),
        }
    }

    fn refresh(&mut self) -> bool {
        match self.client.fetch_document() {
            Ok(document) => {
                self.document = document;
                true
            }
            Err(e) => {
                self.report("Refresh", e);
                false
            }
        }
    }

    /// Replay a backend result against the mirror.
    fn apply(&mut self, operation: &Operation) {
        match sheetsync_core::apply(&mut self.document, operation) {
            Applied::Changed => {}
            Applied::Skipped => log::debug!("skipped stale operation: {:?}", operation),
            Applied::NeedsRefresh => self.apply_sheet_level(operation),
        }
        self.clamp_selection();
    }

    fn apply_sheet_level(&mut self, operation: &Operation) {
        self.navigator.leave_sheet(self.active_sheet);
        self.buffer.clear();
        self.bar.clear();
        let before: Vec<String> = self.document.sheets.iter().map(|s| s.name.clone()).collect();
        if !self.refresh() {
            return;
        }
        let target = match operation {
            Operation::AddSheet { sheet_index, .. } => {
                self.navigator.insert_sheet(*sheet_index);
                *sheet_index
            }
            Operation::DeleteSheet { sheet_index } => {
                let removed = removed_sheet_index(&before, &self.document);
                self.navigator.forget_sheet(removed);
                *sheet_index
            }
            _ => self.active_sheet,
        };
        self.enter_sheet(target);
    }

    fn clamp_selection(&mut self) {
        let Some(key) = self.navigator.selection() else {
            return;
        };
        let Some(sheet) = self.document.sheet(self.active_sheet) else {
            self.navigator.clear();
            return;
        };
        if sheet.row_count() == 0 {
            self.navigator.clear();
            self.bar.clear();
            return;
        }
        let clamped = CellKey::new(
            key.row.min(sheet.row_count() - 1),
            key.col.min(sheet.column_count().saturating_sub(1)),
        );
        if clamped != key {
            self.navigator.click(clamped);
        }
        self.bar = self.display_value(clamped);
    }

    fn run(
        &mut self,
        action: &str,
        call: impl FnOnce(&mut OperationClient<B>) -> sheetsync_core::Result<Operation>,
    ) -> Option<Operation> {
        self.settle();
        match call(&mut self.client) {
            Ok(operation) => {
                self.apply(&operation);
                Some(operation)
            }
            Err(e) => {
                self.report(action, e);
                None
            }
        }
    }

    pub fn add_row(&mut self, at: usize) -> Option<Operation> {
        let sheet = self.active_sheet;
        self.run("Insert row", |c| c.add_row(sheet, at))
    }

    pub fn delete_row(&mut self, row: usize) -> Option<Operation> {
        let sheet = self.active_sheet;
        self.settle();
        let contents = self
            .document
            .sheet(sheet)
            .and_then(|s| s.rows.get(row))
            .cloned()
            .unwrap_or_default();
        self.run("Delete row", |c| c.delete_row(sheet, row, contents))
    }

    pub fn add_column(&mut self, at: usize) -> Option<Operation> {
        let sheet = self.active_sheet;
        self.run("Insert column", |c| c.add_column(sheet, at))
    }

    pub fn delete_column(&mut self, col: usize) -> Option<Operation> {
        let sheet = self.active_sheet;
        self.settle();
        let contents = self
            .document
            .sheet(sheet)
            .map(|s| s.column(col))
            .unwrap_or_default();
        self.run("Delete column", |c| c.delete_column(sheet, col, contents))
    }

    /// Append a blank sheet and switch to it.
    pub fn add_sheet(&mut self) -> Option<Operation> {
        self.run("Add sheet", |c| c.add_sheet())
    }

    pub fn delete_sheet(&mut self, index: usize) -> Option<Operation> {
        let active = self.active_sheet;
        let operation = self.run("Delete sheet", |c| c.delete_sheet(index))?;
        // Deleting another sheet keeps the current one active.
        if index != active {
            let keep = if index < active { active - 1 } else { active };
            self.navigator.leave_sheet(self.active_sheet);
            self.enter_sheet(keep);
        }
        Some(operation)
    }

    pub fn undo(&mut self) -> Option<Operation> {
        let operation = self.run("Undo", |c| c.undo())?;
        self.notifications
            .info(format!("Undid {}", operation.describe()));
        Some(operation)
    }

    pub fn redo(&mut self) -> Option<Operation> {
        let operation = self.run("Redo", |c| c.redo())?;
        self.notifications
            .info(format!("Redid {}", operation.describe()));
        Some(operation)
    }

    /// Paste tab/newline separated text with its top-left cell at `origin`.
    /// Cells past the last row are dropped.
    pub fn paste(&mut self, origin: CellKey, text: &str) -> Option<Operation> {
        let sheet = self.active_sheet;
        self.settle();
        let rows = self.document.sheet(sheet).map_or(0, |s| s.row_count());
        let mut edits = Vec::new();
        for (dr, line) in parse_clipboard(text).into_iter().enumerate() {
            let row = origin.row + dr;
            if row >= rows {
                break;
            }
            for (dc, cell) in line.iter().enumerate() {
                let col = origin.col + dc;
                let old = self.document.cell(sheet, CellKey::new(row, col)).clone();
                edits.push(CellEdit::new(row, col, old, value::parse(cell)));
            }
        }
        if edits.is_empty() {
            return None;
        }
        let count = edits.len();
        let operation = self.run("Paste", |c| c.set_cells(sheet, edits))?;
        self.notifications.info(format!("Pasted {} cell(s)", count));
        Some(operation)
    }

    // ----- search -----

    /// Run the search panel's query. Returns the number of matches.
    pub fn search(&mut self) -> usize {
        // Persist first so the backend index sees what the grid shows.
        self.flush();
        match self.search.run(&mut self.client, self.active_sheet) {
            Ok(found) => found,
            Err(e) => {
                self.report("Search", e);
                0
            }
        }
    }

    /// Go to a search result, switching sheet first when needed, and ask
    /// the grid to center on it.
    pub fn open_match(&mut self, found: &SearchMatch) {
        let key = CellKey::new(found.row, found.col);
        if found.sheet_index != self.active_sheet {
            if !self.switch_sheet(found.sheet_index) {
                return;
            }
        } else {
            self.blur();
        }
        self.navigator.navigate(key);
        self.bar = self.display_value(key);
    }

    // ----- file -----

    /// Default save path: `{stem}_edited.{csv|xlsx}` next to the source.
    pub fn suggested_save_path(&self) -> PathBuf {
        dialog::suggest_save_path(self.path.as_deref(), &self.document.file_name)
    }

    /// Persist pending edits and write the workbook to `path`.
    pub fn save(&mut self, path: Option<&Path>) -> Option<PathBuf> {
        self.settle();
        if let Some(key) = self.navigator.selection() {
            self.bar = self.display_value(key);
        }
        let target = path.map_or_else(|| self.suggested_save_path(), Path::to_path_buf);
        match self.client.save_file(&target, &self.document) {
            Ok(()) => {
                self.document.file_name = sheetsync_core::storage::file_name_of(&target);
                self.path = Some(target.clone());
                self.notifications.info(format!("Saved {}", target.display()));
                Some(target)
            }
            Err(e) => {
                self.report("Save", e);
                None
            }
        }
    }

    /// Persist pending edits, then close the workbook and hand the backend back.
    pub fn close(mut self) -> B {
        self.settle();
        self.navigator.reset();
        self.search.clear();
        self.bar.clear();
        self.client.close();
        self.client.into_backend()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clipboard() {
        assert_eq!(
            parse_clipboard("a\tb\n1\t\t3\n"),
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["1".to_string(), String::new(), "3".to_string()],
            ]
        );
        assert!(parse_clipboard("").is_empty());
    }

    #[test]
    fn test_removed_sheet_index() {
        use sheetsync_core::Sheet;
        let before: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let after = Document::new("x", vec![Sheet::blank("A"), Sheet::blank("C")]);
        assert_eq!(removed_sheet_index(&before, &after), 1);
        let after = Document::new("x", vec![Sheet::blank("A"), Sheet::blank("B")]);
        assert_eq!(removed_sheet_index(&before, &after), 2);
    }
}
