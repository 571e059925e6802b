//! File storage: CSV (single sheet) and spreadsheet workbooks.

mod csv;
mod xlsx;

pub use self::csv::{parse_csv, read_csv, write_csv, write_csv_content};
pub use self::xlsx::{read_workbook, write_xlsx};

use crate::document::Document;
use crate::error::{Result, SheetError};
use std::path::Path;

/// Formats recognised by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
    Ods,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Option<FileFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(FileFormat::Csv),
            "xlsx" => Some(FileFormat::Xlsx),
            "xls" => Some(FileFormat::Xls),
            "ods" => Some(FileFormat::Ods),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Xls => "xls",
            FileFormat::Ods => "ods",
        }
    }

    pub fn can_write(self) -> bool {
        matches!(self, FileFormat::Csv | FileFormat::Xlsx)
    }
}

/// File name component of a path, for display and save suggestions.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Read any supported file into a document.
pub fn read_file(path: &Path) -> Result<Document> {
    match FileFormat::from_path(path).ok_or(SheetError::UnsupportedFormat)? {
        FileFormat::Csv => read_csv(path),
        FileFormat::Xlsx | FileFormat::Xls | FileFormat::Ods => read_workbook(path),
    }
}

/// Write a document; CSV keeps only the first sheet.
pub fn save_file(path: &Path, document: &Document) -> Result<()> {
    match FileFormat::from_path(path).ok_or(SheetError::UnsupportedFormat)? {
        FileFormat::Csv => write_csv(path, document),
        FileFormat::Xlsx => write_xlsx(path, document),
        FileFormat::Xls | FileFormat::Ods => Err(SheetError::UnsupportedFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Sheet;
    use crate::value::CellValue;

    #[test]
    fn test_format_from_path_case_insensitive() {
        assert_eq!(FileFormat::from_path(Path::new("a/B.CSV")), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_path(Path::new("report.Xlsx")), Some(FileFormat::Xlsx));
        assert_eq!(FileFormat::from_path(Path::new("notes.txt")), None);
        assert_eq!(FileFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_unsupported_extension_errors() {
        let err = read_file(Path::new("/tmp/whatever.txt")).unwrap_err();
        assert!(matches!(err, SheetError::UnsupportedFormat));

        let doc = Document::new("x.ods", vec![Sheet::blank("Sheet1")]);
        let err = save_file(Path::new("/tmp/whatever.ods"), &doc).unwrap_err();
        assert!(matches!(err, SheetError::UnsupportedFormat));
    }

    #[test]
    fn test_csv_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let doc = Document::new(
            "data.csv",
            vec![Sheet::new(
                "Sheet1",
                vec![
                    vec![CellValue::text("id"), CellValue::text("flag")],
                    vec![CellValue::text("0908"), CellValue::Boolean(true)],
                    vec![CellValue::Number(2.5), CellValue::Empty],
                ],
            )],
        );

        save_file(&path, &doc).unwrap();
        let loaded = read_file(&path).unwrap();

        assert_eq!(loaded.file_name, "data.csv");
        assert_eq!(loaded.sheets, doc.sheets);
    }

    #[test]
    fn test_xlsx_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        let doc = Document::new(
            "book.xlsx",
            vec![
                Sheet::new(
                    "First",
                    vec![
                        vec![CellValue::text("name"), CellValue::Number(42.0)],
                        vec![CellValue::Boolean(false), CellValue::text("x")],
                    ],
                ),
                Sheet::new("Second", vec![vec![CellValue::text("only")]]),
            ],
        );

        save_file(&path, &doc).unwrap();
        let loaded = read_file(&path).unwrap();

        assert_eq!(loaded.sheets.len(), 2);
        assert_eq!(loaded.sheets[0].name, "First");
        assert_eq!(loaded.sheets[0].cell(0, 1), &CellValue::Number(42.0));
        assert_eq!(loaded.sheets[0].cell(1, 0), &CellValue::Boolean(false));
        assert_eq!(loaded.sheets[1].cell(0, 0), &CellValue::text("only"));
    }
}
