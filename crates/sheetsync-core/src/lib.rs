//! sheetsync-core - UI-agnostic workbook model, value coercion, reducer and storage.

pub mod cell_key;
pub mod document;
pub mod error;
pub mod operation;
pub mod reducer;
pub mod storage;
pub mod value;

pub use cell_key::CellKey;
pub use document::{Document, Sheet};
pub use error::{Result, SheetError};
pub use operation::{CellChange, Operation};
pub use reducer::{Applied, apply};
pub use value::CellValue;
