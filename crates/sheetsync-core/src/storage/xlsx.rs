//! Workbook import (xlsx, xls, ods via calamine) and xlsx export.

use crate::document::{Document, Sheet};
use crate::error::{Result, SheetError};
use crate::value::CellValue;
use calamine::{Data, Reader, open_workbook_auto};
use rust_xlsxwriter::Workbook;
use std::path::Path;

fn data_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Boolean(*b),
        // Dates are kept as their serial number.
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
    }
}

/// Read every sheet of a workbook file.
pub fn read_workbook(path: &Path) -> Result<Document> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(SheetError::Read("workbook contains no sheets".to_string()));
    }

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in &sheet_names {
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| SheetError::Read(format!("sheet '{}': {}", name, e)))?;

        // Ranges start at the first used cell; pad back to A1.
        let (start_row, start_col) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<CellValue>> = Vec::with_capacity(start_row + range.height());
        rows.resize(start_row, Vec::new());
        for data_row in range.rows() {
            let mut row = vec![CellValue::Empty; start_col];
            row.extend(data_row.iter().map(data_to_value));
            rows.push(row);
        }
        sheets.push(Sheet::new(name.clone(), rows));
    }

    log::debug!("read {} sheet(s) from {}", sheets.len(), path.display());
    Ok(Document::new(super::file_name_of(path), sheets))
}

/// Write every sheet of a document as an xlsx workbook.
pub fn write_xlsx(path: &Path, document: &Document) -> Result<()> {
    let mut workbook = Workbook::new();

    for sheet in &document.sheets {
        let worksheet = workbook.add_worksheet().set_name(&sheet.name)?;

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let row_u32 = u32::try_from(row_idx)
                .map_err(|_| SheetError::Write(format!("row {} out of range", row_idx)))?;
            for (col_idx, cell) in row.iter().enumerate() {
                let col_u16 = u16::try_from(col_idx)
                    .map_err(|_| SheetError::Write(format!("column {} out of range", col_idx)))?;
                match cell {
                    CellValue::Text(s) => {
                        worksheet.write_string(row_u32, col_u16, s)?;
                    }
                    CellValue::Number(n) => {
                        worksheet.write_number(row_u32, col_u16, *n)?;
                    }
                    CellValue::Boolean(b) => {
                        worksheet.write_boolean(row_u32, col_u16, *b)?;
                    }
                    CellValue::Empty => {}
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}
