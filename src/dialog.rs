//! File choose/save helpers.
//!
//! The terminal front end has no native picker, so these produce the
//! extension filter and the prefilled save path its prompt starts from.

use sheetsync_core::storage::FileFormat;
use std::path::{Path, PathBuf};

/// Extensions offered when choosing a file to open.
pub fn spreadsheet_filters() -> &'static [&'static str] {
    &["xlsx", "xls", "ods", "csv"]
}

/// True when `path` has one of the [`spreadsheet_filters`] extensions.
pub fn is_spreadsheet(path: &Path) -> bool {
    FileFormat::from_path(path).is_some()
}

/// Default save name for a file: the stem plus `_edited`, keeping CSV as CSV
/// and saving every other format as xlsx.
pub fn suggest_save(file_name: &str) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(file_name);
    let format = match FileFormat::from_path(path) {
        Some(FileFormat::Csv) => FileFormat::Csv,
        _ => FileFormat::Xlsx,
    };
    format!("{}_edited.{}", stem, format.extension())
}

/// [`suggest_save`] placed next to the file that was opened.
pub fn suggest_save_path(opened: Option<&Path>, file_name: &str) -> PathBuf {
    let name = suggest_save(file_name);
    match opened.and_then(Path::parent) {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}
