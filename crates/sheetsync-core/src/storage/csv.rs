//! CSV import/export.
//!
//! CSV files hold a single sheet named "Sheet1". Every field goes through
//! value coercion, so "0908" stays text and "2.5" becomes a number. Rows
//! may have different widths.

use crate::document::{Document, Sheet};
use crate::error::Result;
use crate::value::{self, CellValue};
use std::path::Path;

/// Read a CSV file into a single-sheet document.
pub fn read_csv(path: &Path) -> Result<Document> {
    let content = std::fs::read_to_string(path)?;
    let rows = parse_csv(&content)?;
    log::debug!("read {} csv row(s) from {}", rows.len(), path.display());
    Ok(Document::new(
        super::file_name_of(path),
        vec![Sheet::new("Sheet1", rows)],
    ))
}

/// Parse CSV text into rows of coerced values.
pub fn parse_csv(content: &str) -> Result<Vec<Vec<CellValue>>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(value::parse).collect());
    }
    Ok(rows)
}

/// Write the first sheet of a document as CSV.
pub fn write_csv(path: &Path, document: &Document) -> Result<()> {
    let content = write_csv_content(document)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Render the first sheet of a document as CSV text.
pub fn write_csv_content(document: &Document) -> Result<String> {
    let mut writer = ::csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    if let Some(sheet) = document.sheets.first() {
        for row in &sheet.rows {
            writer.write_record(row.iter().map(value::format))?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| crate::error::SheetError::Write(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| crate::error::SheetError::Write(e.to_string()))
}
