//! sheetsync - terminal spreadsheet editing over a command backend.
//!
//! The workbook model and file formats live in `sheetsync-core`, the
//! authoritative store with undo/redo and search in `sheetsync-engine`.
//! This crate holds the editing session that keeps a local mirror in step
//! with the backend, plus configuration and the terminal front end.

pub mod config;
pub mod dialog;
pub mod error;
pub mod session;

#[cfg(feature = "tui")]
pub mod tui;
