//! Whole-cell, case-insensitive search over a workbook.
//!
//! Each sheet gets an inverted index from lowercased display text to the
//! cells holding it. Indexes are rebuilt lazily: mutations only mark the
//! affected sheet stale.

use serde::{Deserialize, Serialize};
use sheetsync_core::cell_key::position_label;
use sheetsync_core::{CellKey, Document, Sheet, value};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    #[default]
    CurrentSheet,
    AllSheets,
}

/// One hit, annotated with where it lives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub sheet_index: usize,
    pub sheet_name: String,
    pub row: usize,
    pub col: usize,
    pub value: String,
    /// A1-style label, e.g. "C5".
    pub position: String,
}

type SheetIndex = HashMap<String, Vec<CellKey>>;

fn build_sheet_index(sheet: &Sheet) -> SheetIndex {
    let mut index: SheetIndex = HashMap::new();
    for (row, cells) in sheet.rows.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            let text = value::format(cell);
            if text.is_empty() {
                continue;
            }
            index
                .entry(text.to_lowercase())
                .or_default()
                .push(CellKey::new(row, col));
        }
    }
    index
}

/// Per-sheet inverted indexes, `None` when stale.
#[derive(Debug, Default)]
pub struct SearchIndex {
    sheets: Vec<Option<SheetIndex>>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark one sheet stale.
    pub fn invalidate(&mut self, sheet: usize) {
        if let Some(slot) = self.sheets.get_mut(sheet) {
            *slot = None;
        }
    }

    /// Mark every sheet stale (after sheets were added, removed or reloaded).
    pub fn invalidate_all(&mut self) {
        self.sheets.clear();
    }

    fn ensure(&mut self, document: &Document, sheet: usize) {
        if self.sheets.len() != document.sheets.len() {
            self.sheets = vec![None; document.sheets.len()];
        }
        if let (Some(slot), Some(s)) = (self.sheets.get_mut(sheet), document.sheet(sheet))
            && slot.is_none()
        {
            log::debug!("rebuilding search index for sheet {}", sheet);
            *slot = Some(build_sheet_index(s));
        }
    }

    /// Find cells whose display text equals `query`, ignoring case.
    ///
    /// `CurrentSheet` searches only `current` (sheet 0 when absent). An empty
    /// query matches nothing.
    pub fn search(
        &mut self,
        document: &Document,
        query: &str,
        scope: SearchScope,
        current: Option<usize>,
    ) -> Vec<SearchMatch> {
        if query.is_empty() {
            return Vec::new();
        }
        let token = query.to_lowercase();
        let targets: Vec<usize> = match scope {
            SearchScope::CurrentSheet => vec![current.unwrap_or(0)],
            SearchScope::AllSheets => (0..document.sheets.len()).collect(),
        };

        let mut results = Vec::new();
        for sheet_index in targets {
            self.ensure(document, sheet_index);
            let (Some(Some(index)), Some(sheet)) =
                (self.sheets.get(sheet_index), document.sheet(sheet_index))
            else {
                continue;
            };
            let Some(keys) = index.get(&token) else {
                continue;
            };
            for key in keys {
                results.push(SearchMatch {
                    sheet_index,
                    sheet_name: sheet.name.clone(),
                    row: key.row,
                    col: key.col,
                    value: sheet.formatted(key.row, key.col),
                    position: position_label(key.row, key.col),
                });
            }
        }
        results.sort_by_key(|m| (m.sheet_index, m.row, m.col));
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetsync_core::CellValue;

    fn doc() -> Document {
        Document::new(
            "t.xlsx",
            vec![
                Sheet::new(
                    "Alpha",
                    vec![
                        vec![CellValue::text("Apple"), CellValue::Number(42.0)],
                        vec![CellValue::Empty, CellValue::text("apple")],
                    ],
                ),
                Sheet::new(
                    "Beta",
                    vec![vec![CellValue::Empty, CellValue::Empty, CellValue::Number(42.0)]; 5],
                ),
            ],
        )
    }

    #[test]
    fn test_case_insensitive_whole_cell() {
        let d = doc();
        let mut index = SearchIndex::new();
        let hits = index.search(&d, "APPLE", SearchScope::CurrentSheet, Some(0));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].position, "A1");
        assert_eq!(hits[1].position, "B2");
        assert_eq!(hits[1].value, "apple");

        assert!(index.search(&d, "app", SearchScope::AllSheets, None).is_empty());
    }

    #[test]
    fn test_current_sheet_scope_excludes_other_sheets() {
        let d = doc();
        let mut index = SearchIndex::new();
        let hits = index.search(&d, "42", SearchScope::CurrentSheet, Some(0));
        assert_eq!(hits.len(), 1);
        assert!(hits.iter().all(|m| m.sheet_index == 0));
    }

    #[test]
    fn test_all_sheets_annotates_origin() {
        let d = doc();
        let mut index = SearchIndex::new();
        let hits = index.search(&d, "42", SearchScope::AllSheets, Some(0));
        assert_eq!(hits.len(), 6);
        assert_eq!(hits[0].sheet_name, "Alpha");
        assert!(hits[1..].iter().all(|m| m.sheet_name == "Beta"));
        assert_eq!(hits[5].position, "C5");
    }

    #[test]
    fn test_empty_query_and_missing_sheet() {
        let d = doc();
        let mut index = SearchIndex::new();
        assert!(index.search(&d, "", SearchScope::AllSheets, None).is_empty());
        assert!(index.search(&d, "42", SearchScope::CurrentSheet, Some(9)).is_empty());
    }

    #[test]
    fn test_invalidate_picks_up_changes() {
        let mut d = doc();
        let mut index = SearchIndex::new();
        assert!(index.search(&d, "pear", SearchScope::CurrentSheet, Some(0)).is_empty());

        d.sheets[0].set(1, 0, CellValue::text("Pear"));
        // Still stale until invalidated.
        assert!(index.search(&d, "pear", SearchScope::CurrentSheet, Some(0)).is_empty());
        index.invalidate(0);
        assert_eq!(index.search(&d, "pear", SearchScope::CurrentSheet, Some(0)).len(), 1);
    }
}
