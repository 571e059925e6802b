use crate::config::Layout;
use crate::session::Session;
use crate::session::selection::ScrollGeometry;
use sheetsync_core::CellKey;
use sheetsync_engine::LocalBackend;
use std::time::Instant;

/// Modal editing state for the terminal front end.
///
/// - [`Normal`](Mode::Normal): move around and run single-key commands
/// - [`Edit`](Mode::Edit): type into the selected grid cell
/// - [`Bar`](Mode::Bar): type into the editor bar above the grid
/// - [`Search`](Mode::Search): type a query and browse its matches
/// - [`Prompt`](Mode::Prompt): answer a one-line prompt (save path)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Edit,
    Bar,
    Search,
    Prompt,
}

/// Terminal application state: the session plus view-only state.
pub struct App {
    pub session: Session<LocalBackend>,
    pub layout: Layout,
    pub mode: Mode,
    /// Text being typed in Edit, Bar, Search or Prompt mode
    pub input: String,
    /// Cursor position within `input` (byte offset)
    pub input_cursor: usize,
    /// Viewport offset (column)
    pub viewport_col: usize,
    /// Viewport offset (row)
    pub viewport_row: usize,
    /// Number of visible columns
    pub visible_cols: usize,
    /// Number of visible rows
    pub visible_rows: usize,
    /// Text yanked with `y`, pasted with `p`
    pub clipboard: Option<String>,
    /// Search results panel is shown
    pub show_results: bool,
}

impl App {
    pub fn new(session: Session<LocalBackend>, layout: Layout) -> Self {
        let mut app = App {
            session,
            layout,
            mode: Mode::Normal,
            input: String::new(),
            input_cursor: 0,
            viewport_col: 0,
            viewport_row: 0,
            visible_cols: 8,
            visible_rows: 20,
            clipboard: None,
            show_results: false,
        };
        app.session.select_cell(CellKey::new(0, 0));
        app
    }

    pub fn cursor(&self) -> CellKey {
        self.session.selection().unwrap_or_default()
    }

    pub fn sheet_size(&self) -> (usize, usize) {
        self.session
            .document()
            .sheet(self.session.active_sheet())
            .map(|s| (s.row_count(), s.column_count()))
            .unwrap_or((0, 0))
    }

    /// Move the selection by delta, clamped to the sheet.
    pub fn move_cursor(&mut self, dx: i32, dy: i32) {
        let (rows, cols) = self.sheet_size();
        if rows == 0 {
            return;
        }
        let cur = self.cursor();
        let col = (cur.col as i64 + dx as i64).clamp(0, cols.max(1) as i64 - 1) as usize;
        let row = (cur.row as i64 + dy as i64).clamp(0, rows as i64 - 1) as usize;
        self.session.select_cell(CellKey::new(row, col));
        self.update_viewport();
    }

    pub fn goto_row(&mut self, row: usize) {
        let cur = self.cursor();
        let (rows, _) = self.sheet_size();
        let row = row.min(rows.saturating_sub(1));
        self.session.select_cell(CellKey::new(row, cur.col));
        self.update_viewport();
    }

    /// Keep the selection inside the viewport.
    pub fn update_viewport(&mut self) {
        let cur = self.cursor();
        if cur.col < self.viewport_col {
            self.viewport_col = cur.col;
        } else if cur.col >= self.viewport_col + self.visible_cols {
            self.viewport_col = cur.col - self.visible_cols + 1;
        }

        if cur.row < self.viewport_row {
            self.viewport_row = cur.row;
        } else if cur.row >= self.viewport_row + self.visible_rows {
            self.viewport_row = cur.row - self.visible_rows + 1;
        }
    }

    /// Apply a pending centering request from the session, if any.
    pub fn apply_auto_scroll(&mut self) {
        let l = self.layout;
        let geometry = ScrollGeometry {
            row_height: l.row_height as u32,
            column_width: l.column_width as u32 + 1,
            row_label_width: l.row_label_width as u32,
            viewport_width: (self.visible_cols as u32) * (l.column_width as u32 + 1)
                + l.row_label_width as u32,
            viewport_height: self.visible_rows as u32 * l.row_height as u32,
        };
        if let Some(offset) = self.session.take_scroll(&geometry) {
            self.viewport_row = (offset.top / geometry.row_height.max(1)) as usize;
            self.viewport_col = (offset.left.saturating_sub(geometry.row_label_width)
                / geometry.column_width.max(1)) as usize;
        }
        self.update_viewport();
    }

    fn set_input(&mut self, text: String) {
        self.input_cursor = text.len();
        self.input = text;
    }

    /// Enter Edit mode on the selected cell, seeded with its displayed value.
    pub fn enter_edit_mode(&mut self) {
        let key = self.cursor();
        self.session.begin_edit(key);
        self.set_input(self.session.display_value(key));
        self.mode = Mode::Edit;
    }

    /// Enter Edit mode with an empty cell.
    pub fn change_cell(&mut self) {
        self.enter_edit_mode();
        self.set_input(String::new());
        let key = self.cursor();
        self.session.edit_cell(key, "", Instant::now());
    }

    pub fn enter_bar_mode(&mut self) {
        self.set_input(self.session.bar_text().to_string());
        self.mode = Mode::Bar;
    }

    /// Push the current input to the session after a keystroke.
    pub fn input_changed(&mut self) {
        let now = Instant::now();
        match self.mode {
            Mode::Edit => {
                let key = self.cursor();
                let text = self.input.clone();
                self.session.edit_cell(key, &text, now);
            }
            Mode::Bar => {
                let text = self.input.clone();
                self.session.bar_input(&text, now);
            }
            _ => {}
        }
    }

    pub fn commit_edit(&mut self) {
        let key = self.cursor();
        match self.mode {
            Mode::Edit => self.session.commit_cell(key),
            Mode::Bar => self.session.bar_commit(),
            _ => {}
        }
        self.mode = Mode::Normal;
        self.set_input(String::new());
    }

    pub fn clear_current_cell(&mut self) {
        let key = self.cursor();
        self.session.begin_edit(key);
        self.session.edit_cell(key, "", Instant::now());
        self.session.commit_cell(key);
    }

    pub fn enter_search_mode(&mut self) {
        self.set_input(self.session.search.query.clone());
        self.mode = Mode::Search;
        self.show_results = true;
    }

    pub fn run_search(&mut self) {
        self.session.search.query = self.input.clone();
        let found = self.session.search();
        self.session
            .notifications
            .info(format!("{} match(es) for \"{}\"", found, self.input));
    }

    pub fn open_selected_match(&mut self) {
        let Some(found) = self.session.search.selected().cloned() else {
            return;
        };
        self.session.open_match(&found);
        self.mode = Mode::Normal;
    }

    pub fn open_save_prompt(&mut self) {
        let suggested = self.session.suggested_save_path();
        self.set_input(suggested.display().to_string());
        self.mode = Mode::Prompt;
    }

    pub fn save_to_input(&mut self) {
        let path = std::path::PathBuf::from(self.input.trim());
        if !path.as_os_str().is_empty() {
            self.session.save(Some(&path));
        }
        self.mode = Mode::Normal;
        self.set_input(String::new());
    }

    pub fn yank(&mut self) {
        let key = self.cursor();
        self.clipboard = Some(self.session.display_value(key));
        self.session
            .notifications
            .info(format!("Yanked {}", key));
    }

    pub fn paste(&mut self) {
        let Some(text) = self.clipboard.clone() else {
            self.session.notifications.info("Nothing to paste");
            return;
        };
        let origin = self.cursor();
        self.session.paste(origin, &text);
    }

    pub fn insert_row(&mut self, below: bool) {
        let cur = self.cursor();
        let at = if below { cur.row + 1 } else { cur.row };
        if self.session.add_row(at).is_some() && below {
            self.move_cursor(0, 1);
        }
    }

    pub fn delete_row(&mut self) {
        let row = self.cursor().row;
        self.session.delete_row(row);
        self.update_viewport();
    }

    pub fn insert_column(&mut self, right: bool) {
        let (rows, cols) = self.sheet_size();
        let cur = self.cursor();
        let at = match (rows, right) {
            (0, _) => cols,
            (_, true) => cur.col + 1,
            (_, false) => cur.col,
        };
        if self.session.add_column(at).is_some() && right {
            self.move_cursor(1, 0);
        }
    }

    pub fn delete_column(&mut self) {
        let col = self.cursor().col;
        self.session.delete_column(col);
        self.update_viewport();
    }

    /// Cycle through sheets.
    pub fn next_sheet(&mut self, forward: bool) {
        let count = self.session.document().sheets.len();
        if count < 2 {
            return;
        }
        let active = self.session.active_sheet();
        let target = if forward {
            (active + 1) % count
        } else {
            (active + count - 1) % count
        };
        self.session.switch_sheet(target);
        if self.session.selection().is_none() {
            self.session.select_cell(CellKey::new(0, 0));
        }
        self.viewport_row = 0;
        self.viewport_col = 0;
        self.update_viewport();
    }

    pub fn add_sheet(&mut self) {
        self.session.add_sheet();
        if self.session.selection().is_none() {
            self.session.select_cell(CellKey::new(0, 0));
        }
    }

    pub fn delete_sheet(&mut self) {
        let active = self.session.active_sheet();
        self.session.delete_sheet(active);
        if self.session.selection().is_none() {
            self.session.select_cell(CellKey::new(0, 0));
        }
    }

    /// Leave any text mode without committing anything new.
    pub fn cancel(&mut self) {
        match self.mode {
            Mode::Edit | Mode::Bar => {
                // Typed text was already written optimistically; settle it.
                self.commit_edit();
            }
            Mode::Search => {
                self.mode = Mode::Normal;
                self.show_results = false;
            }
            Mode::Prompt => {
                self.mode = Mode::Normal;
                self.set_input(String::new());
            }
            Mode::Normal => self.show_results = false,
        }
    }
}
