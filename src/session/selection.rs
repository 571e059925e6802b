//! Selection and navigation state.
//!
//! Tracks the selected cell on the active sheet, remembers the last
//! selection of every sheet, and carries a one-shot request to center the
//! view on the selection after a search navigation.

use sheetsync_core::CellKey;
use std::collections::HashMap;

/// Grid geometry needed to center a cell, in display units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollGeometry {
    pub row_height: u32,
    pub column_width: u32,
    pub row_label_width: u32,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

/// Scroll position of the grid content, in display units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollOffset {
    pub top: u32,
    pub left: u32,
}

/// Offset that centers `key` in the viewport, clamped at zero.
pub fn center_on(key: CellKey, geometry: &ScrollGeometry) -> ScrollOffset {
    let g = geometry;
    let row = key.row as i64;
    let col = key.col as i64;
    let top = row * g.row_height as i64 - g.viewport_height as i64 / 2 + g.row_height as i64 / 2;
    let left = g.row_label_width as i64 + col * g.column_width as i64
        - g.viewport_width as i64 / 2
        + g.column_width as i64 / 2;
    ScrollOffset {
        top: top.clamp(0, u32::MAX as i64) as u32,
        left: left.clamp(0, u32::MAX as i64) as u32,
    }
}

#[derive(Debug, Default)]
pub struct Navigator {
    selection: Option<CellKey>,
    memory: HashMap<usize, CellKey>,
    pending_scroll: bool,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<CellKey> {
        self.selection
    }

    /// Direct selection in the grid. The cell is already visible, so any
    /// pending centering is cancelled.
    pub fn click(&mut self, key: CellKey) {
        self.selection = Some(key);
        self.pending_scroll = false;
    }

    /// Selection from elsewhere (a search result); centers once.
    pub fn navigate(&mut self, key: CellKey) {
        self.selection = Some(key);
        self.pending_scroll = true;
    }

    pub fn clear(&mut self) {
        self.selection = None;
        self.pending_scroll = false;
    }

    /// Remember the selection of the sheet being left.
    pub fn leave_sheet(&mut self, current: usize) {
        if let Some(key) = self.selection {
            self.memory.insert(current, key);
        }
    }

    /// Restore the remembered selection of `index`, or clear it.
    pub fn enter_sheet(&mut self, index: usize) -> Option<CellKey> {
        self.selection = self.memory.get(&index).copied();
        self.pending_scroll = false;
        self.selection
    }

    pub fn remembered(&self, sheet: usize) -> Option<CellKey> {
        self.memory.get(&sheet).copied()
    }

    /// Selection gone, memory gone (file closed).
    pub fn reset(&mut self) {
        self.selection = None;
        self.memory.clear();
        self.pending_scroll = false;
    }

    /// Sheet `index` was removed; later sheets shift down by one.
    pub fn forget_sheet(&mut self, index: usize) {
        self.memory = std::mem::take(&mut self.memory)
            .into_iter()
            .filter(|(sheet, _)| *sheet != index)
            .map(|(sheet, key)| if sheet > index { (sheet - 1, key) } else { (sheet, key) })
            .collect();
    }

    /// A sheet was inserted at `index`; it and later sheets shift up by one.
    pub fn insert_sheet(&mut self, index: usize) {
        self.memory = std::mem::take(&mut self.memory)
            .into_iter()
            .map(|(sheet, key)| if sheet >= index { (sheet + 1, key) } else { (sheet, key) })
            .collect();
    }

    pub fn scroll_pending(&self) -> bool {
        self.pending_scroll && self.selection.is_some()
    }

    /// Consume the one-shot centering request.
    pub fn take_scroll(&mut self, geometry: &ScrollGeometry) -> Option<ScrollOffset> {
        if !std::mem::take(&mut self.pending_scroll) {
            return None;
        }
        self.selection.map(|key| center_on(key, geometry))
    }
}
