use crossterm::event::{self, KeyCode, KeyModifiers};

use super::app::{App, Mode};
use super::keymap::Action;

/// Handle text editing operations on a buffer with UTF-8 aware cursor movement.
pub(crate) fn handle_text_input(buffer: &mut String, cursor: &mut usize, key: event::KeyEvent) {
    match key.code {
        KeyCode::Left => {
            if *cursor > 0 {
                let mut new_pos = *cursor - 1;
                while new_pos > 0 && !buffer.is_char_boundary(new_pos) {
                    new_pos -= 1;
                }
                *cursor = new_pos;
            }
        }
        KeyCode::Right => {
            if *cursor < buffer.len() {
                let mut new_pos = *cursor + 1;
                while new_pos < buffer.len() && !buffer.is_char_boundary(new_pos) {
                    new_pos += 1;
                }
                *cursor = new_pos;
            }
        }
        KeyCode::Home => {
            *cursor = 0;
        }
        KeyCode::End => {
            *cursor = buffer.len();
        }
        KeyCode::Backspace | KeyCode::Char('h')
            if key.code == KeyCode::Backspace || key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            if *cursor > 0 {
                let mut del_start = *cursor - 1;
                while del_start > 0 && !buffer.is_char_boundary(del_start) {
                    del_start -= 1;
                }
                buffer.drain(del_start..*cursor);
                *cursor = del_start;
            }
        }
        KeyCode::Delete => {
            if *cursor < buffer.len() {
                let mut del_end = *cursor + 1;
                while del_end < buffer.len() && !buffer.is_char_boundary(del_end) {
                    del_end += 1;
                }
                buffer.drain(*cursor..del_end);
            }
        }
        KeyCode::Char(c) => {
            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                buffer.insert(*cursor, c);
                *cursor += c.len_utf8();
            }
        }
        _ => {}
    }
}

/// Result of applying an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyResult {
    Continue,
    Quit,
}

/// Apply an action to the application state.
///
/// Returns `ApplyResult::Quit` if the application should exit.
pub fn apply_action(app: &mut App, action: Action) -> ApplyResult {
    match action {
        Action::Quit => return ApplyResult::Quit,
        Action::Cancel => app.cancel(),

        Action::Move(dx, dy) => app.move_cursor(dx, dy),
        Action::Page(dir) => {
            let delta = app.visible_rows as i32 * dir;
            app.move_cursor(0, delta);
        }
        Action::GotoFirst => app.goto_row(0),
        Action::GotoLast => app.goto_row(usize::MAX),

        Action::EnterEdit => app.enter_edit_mode(),
        Action::ChangeCell => app.change_cell(),
        Action::EnterBar => app.enter_bar_mode(),
        Action::CommitEdit => app.commit_edit(),
        Action::ClearCell => app.clear_current_cell(),

        Action::Yank => app.yank(),
        Action::Paste => app.paste(),
        Action::Undo => {
            app.session.undo();
            app.update_viewport();
        }
        Action::Redo => {
            app.session.redo();
            app.update_viewport();
        }

        Action::InsertRowBelow => app.insert_row(true),
        Action::InsertRowAbove => app.insert_row(false),
        Action::DeleteRow => app.delete_row(),
        Action::InsertColumnRight => app.insert_column(true),
        Action::InsertColumnLeft => app.insert_column(false),
        Action::DeleteColumn => app.delete_column(),

        Action::NextSheet => app.next_sheet(true),
        Action::PrevSheet => app.next_sheet(false),
        Action::AddSheet => app.add_sheet(),
        Action::DeleteSheet => app.delete_sheet(),

        Action::EnterSearch => app.enter_search_mode(),
        Action::RunSearch => {
            // Enter on an unchanged query opens the highlighted match.
            let unchanged = app.input == app.session.search.query;
            if unchanged && !app.session.search.results().is_empty() {
                app.open_selected_match();
            } else {
                app.run_search();
            }
        }
        Action::ToggleScope => {
            app.session.search.toggle_scope();
            app.run_search();
        }
        Action::ResultUp => {
            app.session.search.move_cursor(-1);
            if app.mode == Mode::Normal {
                app.open_selected_match();
            }
        }
        Action::ResultDown => {
            app.session.search.move_cursor(1);
            if app.mode == Mode::Normal {
                app.open_selected_match();
            }
        }
        Action::OpenMatch => app.open_selected_match(),

        Action::Save => {
            app.session.save(None);
        }
        Action::SaveAs => app.open_save_prompt(),
        Action::ConfirmPrompt => app.save_to_input(),
    }
    ApplyResult::Continue
}

/// Text entry for the modes that take typed input.
pub fn handle_input_text(app: &mut App, key: event::KeyEvent) {
    let before = app.input.clone();
    handle_text_input(&mut app.input, &mut app.input_cursor, key);
    if app.input != before {
        app.input_changed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Layout;
    use crate::session::Session;
    use sheetsync_core::CellKey;
    use sheetsync_engine::LocalBackend;
    use std::time::Duration;

    fn app() -> App {
        let session = Session::create(LocalBackend::new(), Duration::from_millis(300)).unwrap();
        App::new(session, Layout::default())
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_input_text(app, event::KeyEvent::new(KeyCode::Char(c), KeyModifiers::empty()));
        }
    }

    #[test]
    fn test_text_input_utf8_cursor() {
        let mut buf = String::from("héllo");
        let mut cursor = buf.len();
        let left = event::KeyEvent::new(KeyCode::Left, KeyModifiers::empty());
        for _ in 0..4 {
            handle_text_input(&mut buf, &mut cursor, left);
        }
        assert_eq!(cursor, 1);
        let bs = event::KeyEvent::new(KeyCode::Delete, KeyModifiers::empty());
        handle_text_input(&mut buf, &mut cursor, bs);
        assert_eq!(buf, "hllo");
    }

    #[test]
    fn test_typing_keeps_grid_and_bar_in_step() {
        let mut app = app();
        apply_action(&mut app, Action::EnterEdit);
        type_str(&mut app, "abc");
        assert_eq!(app.session.bar_text(), "abc");
        assert_eq!(app.session.display_value(CellKey::new(0, 0)), "abc");
        apply_action(&mut app, Action::CommitEdit);
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn test_search_enter_runs_then_opens() {
        let mut app = app();
        apply_action(&mut app, Action::Move(2, 3));
        apply_action(&mut app, Action::EnterEdit);
        type_str(&mut app, "needle");
        apply_action(&mut app, Action::CommitEdit);
        apply_action(&mut app, Action::Move(-2, -3));

        apply_action(&mut app, Action::EnterSearch);
        type_str(&mut app, "NEEDLE");
        apply_action(&mut app, Action::RunSearch);
        assert_eq!(app.session.search.results().len(), 1);
        apply_action(&mut app, Action::RunSearch);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.cursor(), CellKey::new(3, 2));
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        assert_eq!(apply_action(&mut app, Action::Quit), ApplyResult::Quit);
    }
}
