//! Uncommitted cell text, keyed by cell.
//!
//! A cell with an entry is Editing; a cell without one is Idle. While an
//! entry exists its text is what the grid shows for that cell.

use sheetsync_core::{CellKey, CellValue, value};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct EditBuffer {
    entries: HashMap<CellKey, String>,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle -> Editing with `seed` as the starting text.
    pub fn start_edit(&mut self, key: CellKey, seed: String) {
        self.entries.insert(key, seed);
    }

    /// Replace the uncommitted text for `key`.
    pub fn update(&mut self, key: CellKey, text: String) {
        self.entries.insert(key, text);
    }

    /// Editing -> Idle, returning the text that was being edited.
    pub fn commit(&mut self, key: CellKey) -> Option<String> {
        self.entries.remove(&key)
    }

    /// Drop the entry for `key` without committing.
    pub fn discard(&mut self, key: CellKey) {
        self.entries.remove(&key);
    }

    /// Drop every entry without committing.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_editing(&self, key: CellKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn get(&self, key: CellKey) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Text to show for a cell: the buffer wins while present.
    pub fn display(&self, key: CellKey, document_value: &CellValue) -> String {
        match self.entries.get(&key) {
            Some(text) => text.clone(),
            None => value::format(document_value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_wins_until_commit() {
        let mut buf = EditBuffer::new();
        let key = CellKey::new(0, 0);
        let doc_value = CellValue::Number(5.0);

        buf.start_edit(key, "5".to_string());
        buf.update(key, "hello".to_string());
        assert_eq!(buf.display(key, &doc_value), "hello");

        assert_eq!(buf.commit(key), Some("hello".to_string()));
        assert_eq!(buf.display(key, &doc_value), "5");
        assert!(!buf.is_editing(key));
    }

    #[test]
    fn test_commit_idle_cell_is_none() {
        let mut buf = EditBuffer::new();
        assert_eq!(buf.commit(CellKey::new(3, 3)), None);
    }

    #[test]
    fn test_discard_drops_one_entry() {
        let mut buf = EditBuffer::new();
        buf.start_edit(CellKey::new(0, 0), "a".into());
        buf.start_edit(CellKey::new(1, 1), "b".into());
        buf.discard(CellKey::new(0, 0));
        assert!(!buf.is_editing(CellKey::new(0, 0)));
        assert_eq!(buf.get(CellKey::new(1, 1)), Some("b"));
    }

    #[test]
    fn test_clear_drops_all_entries() {
        let mut buf = EditBuffer::new();
        buf.start_edit(CellKey::new(0, 0), "a".into());
        buf.start_edit(CellKey::new(1, 1), "b".into());
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.display(CellKey::new(1, 1), &CellValue::Empty), "");
    }
}
