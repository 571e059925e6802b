//! Error types for sheetsync core.

use thiserror::Error;

/// Errors raised by the workbook model, storage and backend.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read file: {0}")]
    Read(String),

    #[error("Failed to write file: {0}")]
    Write(String),

    #[error("Unsupported file format")]
    UnsupportedFormat,

    #[error("No file loaded")]
    NoDocument,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Sheet {0} does not exist")]
    SheetOutOfRange(usize),

    #[error("Row {row} does not exist in sheet {sheet}")]
    RowOutOfRange { sheet: usize, row: usize },

    #[error("Column {col} does not exist in sheet {sheet}")]
    ColumnOutOfRange { sheet: usize, col: usize },

    #[error("Cannot delete the last sheet")]
    LastSheet,
}

impl From<calamine::Error> for SheetError {
    fn from(err: calamine::Error) -> Self {
        SheetError::Read(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for SheetError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        SheetError::Write(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
