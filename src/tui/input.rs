use crossterm::event::{
    self, Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::prelude::*;
use std::io;
use std::time::{Duration, Instant};

use super::actions::{ApplyResult, apply_action, handle_input_text, handle_text_input};
use super::app::{App, Mode};
use super::keymap::{translate, translate_delete};
use super::ui;

/// Longest wait for input before the loop wakes to expire notices.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Key state that spans more than one key press.
#[derive(Debug, Default)]
pub struct KeyState {
    /// `d` was pressed in Normal mode; the next key picks the target.
    pub pending_d: bool,
}

fn handle_mouse_event(app: &mut App, terminal_area: Rect, mouse: MouseEvent) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    if app.mode != Mode::Normal {
        return;
    }

    let [_bar_area, _tabs_area, grid_area, _results_area, _status_area] =
        ui::split_main_chunks(terminal_area, app.show_results);
    if let Some(key) = ui::grid_cell_at(app, grid_area, mouse.column, mouse.row) {
        app.session.select_cell(key);
        app.update_viewport();
    }
}

/// Dispatch one key press.
pub fn handle_key(app: &mut App, state: &mut KeyState, key: KeyEvent) -> ApplyResult {
    if app.mode == Mode::Normal && state.pending_d {
        state.pending_d = false;
        return match translate_delete(key) {
            Some(action) => apply_action(app, action),
            None => ApplyResult::Continue,
        };
    }
    if app.mode == Mode::Normal
        && key.code == event::KeyCode::Char('d')
        && key.modifiers.is_empty()
    {
        state.pending_d = true;
        return ApplyResult::Continue;
    }

    if let Some(action) = translate(app.mode, key) {
        return apply_action(app, action);
    }

    match app.mode {
        Mode::Edit | Mode::Bar => handle_input_text(app, key),
        Mode::Search | Mode::Prompt => {
            handle_text_input(&mut app.input, &mut app.input_cursor, key);
        }
        Mode::Normal => {}
    }
    ApplyResult::Continue
}

/// Time to wait for the next event: until the commit deadline, capped.
fn poll_timeout(app: &App, now: Instant) -> Duration {
    match app.session.deadline() {
        Some(deadline) => deadline.saturating_duration_since(now).min(IDLE_POLL),
        None => IDLE_POLL,
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let mut state = KeyState::default();
    loop {
        terminal.draw(|f| ui::draw(f, app))?;
        app.apply_auto_scroll();

        if event::poll(poll_timeout(app, Instant::now()))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only process key press events (Windows reports Press + Release)
                    if key.kind == KeyEventKind::Press
                        && handle_key(app, &mut state, key) == ApplyResult::Quit
                    {
                        app.session.settle();
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    let area = Rect::new(0, 0, size.width, size.height);
                    handle_mouse_event(app, area, mouse);
                }
                _ => {}
            }
        }

        app.session.tick(Instant::now());
    }
}
