//! sheetsync-engine - the command executor behind the editing core.
//!
//! The engine owns the authoritative copy of the workbook, records every
//! mutation together with the data needed to invert it, and answers
//! undo/redo and search requests. Clients reach it through [`Backend`].

pub mod backend;
pub mod command;
pub mod history;
pub mod search;

pub use backend::{Backend, EditorFlags, LocalBackend};
pub use command::{CellEdit, Command};
pub use history::History;
pub use search::{SearchIndex, SearchMatch, SearchScope};
