//! Key bindings: translate key events into actions per mode.
//!
//! Text entry (characters, Backspace, cursor keys inside the input) is not
//! bound here; `input.rs` falls back to it when no action matches.

use super::app::Mode;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Cancel,
    Quit,

    Move(i32, i32),
    Page(i32),
    GotoFirst,
    GotoLast,

    EnterEdit,
    ChangeCell,
    EnterBar,
    CommitEdit,
    ClearCell,

    Yank,
    Paste,
    Undo,
    Redo,

    InsertRowBelow,
    InsertRowAbove,
    DeleteRow,
    InsertColumnRight,
    InsertColumnLeft,
    DeleteColumn,

    NextSheet,
    PrevSheet,
    AddSheet,
    DeleteSheet,

    EnterSearch,
    RunSearch,
    ToggleScope,
    ResultUp,
    ResultDown,
    OpenMatch,

    Save,
    SaveAs,
    ConfirmPrompt,
}

pub fn status_hint() -> &'static str {
    "hjkl:move  i:edit  =:bar  o/O:row  a/A:col  dr/dc:delete  u/C-r:undo/redo  Tab:sheet  /:search  w:save  q:quit"
}

/// Translate a key event to an action for the current mode.
///
/// Returns `None` if the key has no binding in this context.
pub fn translate(mode: Mode, key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match mode {
        Mode::Normal => match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Char('r') if ctrl => Some(Action::Redo),
            KeyCode::Char('s') if ctrl => Some(Action::Save),
            KeyCode::Char('u') => Some(Action::Undo),

            KeyCode::Up | KeyCode::Char('k') => Some(Action::Move(0, -1)),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::Move(0, 1)),
            KeyCode::Left | KeyCode::Char('h') => Some(Action::Move(-1, 0)),
            KeyCode::Right | KeyCode::Char('l') => Some(Action::Move(1, 0)),
            KeyCode::PageUp => Some(Action::Page(-1)),
            KeyCode::PageDown => Some(Action::Page(1)),
            KeyCode::Home | KeyCode::Char('g') => Some(Action::GotoFirst),
            KeyCode::End | KeyCode::Char('G') => Some(Action::GotoLast),

            KeyCode::Enter | KeyCode::Char('i') | KeyCode::F(2) => Some(Action::EnterEdit),
            KeyCode::Char('S') => Some(Action::ChangeCell),
            KeyCode::Char('=') => Some(Action::EnterBar),
            KeyCode::Char('x') | KeyCode::Delete => Some(Action::ClearCell),
            KeyCode::Char('y') => Some(Action::Yank),
            KeyCode::Char('p') => Some(Action::Paste),

            KeyCode::Char('o') => Some(Action::InsertRowBelow),
            KeyCode::Char('O') => Some(Action::InsertRowAbove),
            KeyCode::Char('a') => Some(Action::InsertColumnRight),
            KeyCode::Char('A') => Some(Action::InsertColumnLeft),
            // 'd' is handled in input.rs for the dr / dc / ds sequences

            KeyCode::Tab => Some(Action::NextSheet),
            KeyCode::BackTab => Some(Action::PrevSheet),
            KeyCode::Char('T') => Some(Action::AddSheet),

            KeyCode::Char('/') => Some(Action::EnterSearch),
            KeyCode::Char('n') => Some(Action::ResultDown),
            KeyCode::Char('N') => Some(Action::ResultUp),
            KeyCode::Char('w') => Some(Action::SaveAs),
            _ => None,
        },

        Mode::Edit | Mode::Bar => match key.code {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::CommitEdit),
            _ => None,
        },

        Mode::Search => match key.code {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter if ctrl => Some(Action::OpenMatch),
            KeyCode::Enter => Some(Action::RunSearch),
            KeyCode::Tab => Some(Action::ToggleScope),
            KeyCode::Up => Some(Action::ResultUp),
            KeyCode::Down => Some(Action::ResultDown),
            KeyCode::Char('o') if ctrl => Some(Action::OpenMatch),
            _ => None,
        },

        Mode::Prompt => match key.code {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::ConfirmPrompt),
            _ => None,
        },
    }
}

/// Second key of a `d` sequence in Normal mode.
pub fn translate_delete(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('r') | KeyCode::Char('d') => Some(Action::DeleteRow),
        KeyCode::Char('c') => Some(Action::DeleteColumn),
        KeyCode::Char('s') => Some(Action::DeleteSheet),
        _ => None,
    }
}
