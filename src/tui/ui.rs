//! UI rendering

use super::app::{App, Mode};
use super::keymap::status_hint;
use crate::session::notify::Level;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use sheetsync_core::CellKey;
use sheetsync_core::cell_key::col_to_letters;
use sheetsync_engine::SearchScope;

pub(crate) const EDITOR_BAR_HEIGHT: u16 = 3;
pub(crate) const SHEET_TABS_HEIGHT: u16 = 1;
pub(crate) const GRID_MIN_HEIGHT: u16 = 6;
pub(crate) const RESULTS_HEIGHT: u16 = 8;
pub(crate) const STATUS_BAR_HEIGHT: u16 = 1;
pub(crate) const GRID_COLUMN_SPACING: u16 = 1;

/// Editor bar, sheet tabs, grid, search results (empty when hidden), status.
pub(crate) fn split_main_chunks(area: Rect, show_results: bool) -> [Rect; 5] {
    let results = if show_results { RESULTS_HEIGHT } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(EDITOR_BAR_HEIGHT),
            Constraint::Length(SHEET_TABS_HEIGHT),
            Constraint::Min(GRID_MIN_HEIGHT),
            Constraint::Length(results),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3], chunks[4]]
}

/// Map a mouse position inside the grid block to the cell under it.
pub(crate) fn grid_cell_at(
    app: &App,
    grid_area: Rect,
    mouse_col: u16,
    mouse_row: u16,
) -> Option<CellKey> {
    if grid_area.width < 3 || grid_area.height < 4 {
        return None;
    }

    let inner_x = grid_area.x.saturating_add(1);
    let inner_y = grid_area.y.saturating_add(1);
    let inner_right = inner_x.saturating_add(grid_area.width.saturating_sub(2));
    let inner_bottom = inner_y.saturating_add(grid_area.height.saturating_sub(2));

    if mouse_col < inner_x
        || mouse_col >= inner_right
        || mouse_row < inner_y
        || mouse_row >= inner_bottom
    {
        return None;
    }

    // Header row contains column letters, not data cells.
    if mouse_row == inner_y {
        return None;
    }

    let (max_rows, max_cols) = app.sheet_size();
    let row_height = app.layout.row_height.max(1);
    let rel_row = (mouse_row - inner_y - 1) / row_height;
    if rel_row as usize >= app.visible_rows {
        return None;
    }
    let row = app.viewport_row.saturating_add(rel_row as usize);
    if row >= max_rows {
        return None;
    }

    let label_end = inner_x
        .saturating_add(app.layout.row_label_width)
        .saturating_add(GRID_COLUMN_SPACING);
    if mouse_col < label_end {
        return None;
    }

    let stride = app.layout.column_width.saturating_add(GRID_COLUMN_SPACING);
    let rel = mouse_col - label_end;
    let offset = (rel / stride.max(1)) as usize;
    if rel % stride.max(1) >= app.layout.column_width || offset >= app.visible_cols {
        return None;
    }
    let col = app.viewport_col + offset;
    if col >= max_cols {
        return None;
    }
    Some(CellKey::new(row, col))
}

/// Draw the application UI
pub fn draw(f: &mut Frame, app: &mut App) {
    let [bar, tabs, grid, results, status] = split_main_chunks(f.area(), app.show_results);

    // Update visible dimensions based on actual size
    let layout = app.layout;
    let available_width = grid
        .width
        .saturating_sub(layout.row_label_width + GRID_COLUMN_SPACING + 2)
        as usize;
    let available_height = grid.height.saturating_sub(3) as usize; // header + borders
    let stride = (layout.column_width + GRID_COLUMN_SPACING) as usize;
    app.visible_cols = (available_width / stride.max(1)).max(1);
    app.visible_rows = (available_height / layout.row_height.max(1) as usize).max(1);
    app.update_viewport();

    draw_editor_bar(f, app, bar);
    draw_sheet_tabs(f, app, tabs);
    draw_grid(f, app, grid);
    if app.show_results {
        draw_results(f, app, results);
    }
    draw_status_bar(f, app, status);
}

fn with_cursor(text: &str, cursor: usize) -> String {
    let cursor = cursor.min(text.len());
    match (text.get(..cursor), text.get(cursor..)) {
        (Some(before), Some(after)) => format!("{}│{}", before, after),
        _ => text.to_string(),
    }
}

fn draw_editor_bar(f: &mut Frame, app: &App, area: Rect) {
    let cell_name = match app.session.selection() {
        Some(key) => key.to_string(),
        None => "-".to_string(),
    };

    let content = match app.mode {
        Mode::Edit | Mode::Bar => {
            format!("{}: {}", cell_name, with_cursor(&app.input, app.input_cursor))
        }
        Mode::Search => format!("/{}", with_cursor(&app.input, app.input_cursor)),
        Mode::Prompt => format!("Save as: {}", with_cursor(&app.input, app.input_cursor)),
        Mode::Normal => {
            let text = app.session.bar_text();
            if text.is_empty() {
                format!("{}: (empty)", cell_name)
            } else {
                format!("{}: {}", cell_name, text)
            }
        }
    };

    let (title, color) = match app.mode {
        Mode::Edit => (" Edit ", Color::Yellow),
        Mode::Bar => (" Editor bar ", Color::Yellow),
        Mode::Search => (" Search ", Color::Cyan),
        Mode::Prompt => (" Save ", Color::Magenta),
        Mode::Normal => (" Cell ", Color::White),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(color));

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn draw_sheet_tabs(f: &mut Frame, app: &App, area: Rect) {
    let active = app.session.active_sheet();
    let mut spans = Vec::new();
    for (i, sheet) in app.session.document().sheets.iter().enumerate() {
        let style = if i == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", sheet.name), style));
        spans.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn header_style(current: bool) -> Style {
    if current {
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_grid(f: &mut Frame, app: &App, area: Rect) {
    let (max_rows, max_cols) = app.sheet_size();
    let cursor = app.session.selection();
    let last_col = (app.viewport_col + app.visible_cols).min(max_cols);
    let last_row = (app.viewport_row + app.visible_rows).min(max_rows);

    let mut header_cells = vec![Cell::from(" ")]; // Corner
    for col in app.viewport_col..last_col {
        let current = cursor.is_some_and(|k| k.col == col);
        header_cells.push(Cell::from(col_to_letters(col)).style(header_style(current)));
    }
    let header = Row::new(header_cells).height(1);

    let mut rows = Vec::new();
    for row in app.viewport_row..last_row {
        let current = cursor.is_some_and(|k| k.row == row);
        let mut cells = vec![Cell::from(format!("{}", row + 1)).style(header_style(current))];

        for col in app.viewport_col..last_col {
            let key = CellKey::new(row, col);
            let style = if cursor == Some(key) {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else if app.session.is_editing(key) {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            cells.push(Cell::from(app.session.display_value(key)).style(style));
        }

        rows.push(Row::new(cells).height(app.layout.row_height.max(1)));
    }

    let mut widths = vec![Constraint::Length(app.layout.row_label_width)];
    widths.extend((app.viewport_col..last_col).map(|_| Constraint::Length(app.layout.column_width)));

    let title = format!(" {} ", app.session.document().file_name);
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(GRID_COLUMN_SPACING);

    f.render_widget(table, area);
}

fn draw_results(f: &mut Frame, app: &App, area: Rect) {
    let panel = &app.session.search;
    let scope = match panel.scope {
        SearchScope::CurrentSheet => "current sheet",
        SearchScope::AllSheets => "all sheets",
    };
    let title = format!(
        " {} match(es) in {} (Tab: scope) ",
        panel.results().len(),
        scope
    );

    let visible = area.height.saturating_sub(2) as usize;
    let skip = panel.cursor().saturating_sub(visible.saturating_sub(1));
    let lines: Vec<Line> = panel
        .results()
        .iter()
        .enumerate()
        .skip(skip)
        .take(visible)
        .map(|(i, m)| {
            let text = format!("{}!{}  {}", m.sheet_name, m.position, m.value);
            if i == panel.cursor() {
                Line::from(Span::styled(
                    text,
                    Style::default().fg(Color::Black).bg(Color::Cyan),
                ))
            } else {
                Line::from(text)
            }
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(title);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let (status, style) = match app.session.notifications.latest() {
        Some(notice) if notice.level == Level::Error => {
            (notice.message.clone(), Style::default().fg(Color::Red))
        }
        Some(notice) => (notice.message.clone(), Style::default().fg(Color::Yellow)),
        None => {
            let flags = app.session.flags();
            let pending = app.session.pending().len();
            let mut info = app.session.document().file_name.clone();
            if pending > 0 {
                info.push_str(&format!(" [{} pending]", pending));
            }
            if app.session.is_loading() {
                info.push_str(" [busy]");
            }
            let undo = if flags.can_undo { "undo" } else { "-" };
            let redo = if flags.can_redo { "redo" } else { "-" };
            (
                format!("{}  |  {}/{}  |  {}", info, undo, redo, status_hint()),
                Style::default().fg(Color::DarkGray),
            )
        }
    };

    f.render_widget(Paragraph::new(Line::from(Span::styled(status, style))), area);
}
