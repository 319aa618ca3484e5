//! Spreadsheet export: write the aggregate page map as CSV.
//!
//! Two shapes are supported, mirroring how people consume per-page tables:
//! everything concatenated into one sheet with a blank separator row between
//! pages, or one sheet (file) per page. Sheet names derive from page keys,
//! sanitized the way spreadsheet applications require: the characters
//! `: / \ ? * [ ]` removed and the result capped at 31 characters.
//!
//! Cells reaching this module are already plain strings — the parser
//! guarantees null cells were normalized to "" — so the writers here do no
//! coercion of their own beyond flexible-width records (row widths may
//! differ across pages within one sheet).

use crate::error::Pdf2GridError;
use crate::output::{sorted_page_keys, PageDataMap};
use csv::WriterBuilder;
use std::path::Path;

/// Characters spreadsheet applications reject in sheet names.
const FORBIDDEN_SHEET_CHARS: &[char] = &[':', '/', '\\', '?', '*', '[', ']'];

/// Maximum sheet-name length accepted by spreadsheet applications.
const MAX_SHEET_NAME_LEN: usize = 31;

/// How to lay out the exported data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    /// One sheet: all pages' rows concatenated in numeric page order, with
    /// one blank row between pages. (default)
    #[default]
    SingleSheet,
    /// One sheet per page, named after the sanitized page key.
    SheetPerPage,
}

/// Write the page map to `path`.
///
/// `SingleSheet` writes one CSV file at `path`; `SheetPerPage` treats `path`
/// as a directory and writes one `<sheet>.csv` per page into it.
pub fn write_csv(
    pages: &PageDataMap,
    path: impl AsRef<Path>,
    mode: ExportMode,
) -> Result<(), Pdf2GridError> {
    let path = path.as_ref();
    match mode {
        ExportMode::SingleSheet => {
            let data = single_sheet_csv(pages)?;
            std::fs::write(path, data).map_err(|e| Pdf2GridError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })
        }
        ExportMode::SheetPerPage => {
            std::fs::create_dir_all(path).map_err(|e| Pdf2GridError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
            for key in sorted_page_keys(pages) {
                let file = path.join(format!("{}.csv", sanitize_sheet_name(key)));
                let data = page_csv(&pages[key])?;
                std::fs::write(&file, data).map_err(|e| Pdf2GridError::OutputWriteFailed {
                    path: file.clone(),
                    source: e,
                })?;
            }
            Ok(())
        }
    }
}

/// Render the single-sheet layout to a CSV string.
pub fn single_sheet_csv(pages: &PageDataMap) -> Result<String, Pdf2GridError> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::<u8>::new());

    for (i, key) in sorted_page_keys(pages).into_iter().enumerate() {
        if i > 0 {
            // Blank separator row between pages.
            writer
                .write_record([""])
                .map_err(|e| Pdf2GridError::Internal(format!("csv: {e}")))?;
        }
        for row in &pages[key] {
            writer
                .write_record(row)
                .map_err(|e| Pdf2GridError::Internal(format!("csv: {e}")))?;
        }
    }

    finish(writer)
}

/// Render one page's grid to a CSV string.
fn page_csv(grid: &[Vec<String>]) -> Result<String, Pdf2GridError> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::<u8>::new());
    for row in grid {
        writer
            .write_record(row)
            .map_err(|e| Pdf2GridError::Internal(format!("csv: {e}")))?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, Pdf2GridError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| Pdf2GridError::Internal(format!("csv: {e}")))?;
    String::from_utf8(bytes).map_err(|e| Pdf2GridError::Internal(format!("csv utf-8: {e}")))
}

/// Turn a page key into a valid sheet name.
///
/// Removes `: / \ ? * [ ]`, truncates to 31 characters on a character
/// boundary, and falls back to "page" when nothing is left.
pub fn sanitize_sheet_name(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .filter(|c| !FORBIDDEN_SHEET_CHARS.contains(c))
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    if cleaned.is_empty() {
        "page".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_page_map() -> PageDataMap {
        let mut pages = PageDataMap::new();
        pages.insert(
            "1".into(),
            vec![
                vec!["Name".into(), "Qty".into()],
                vec!["Bolt".into(), "12".into()],
            ],
        );
        pages.insert("2".into(), vec![vec!["x".into()]]);
        pages
    }

    #[test]
    fn single_sheet_orders_pages_and_separates_with_blank_row() {
        let csv = single_sheet_csv(&two_page_map()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec!["Name,Qty", "Bolt,12", "\"\"", "x"]);
    }

    #[test]
    fn single_sheet_numeric_page_order() {
        let mut pages = PageDataMap::new();
        pages.insert("10".into(), vec![vec!["ten".into()]]);
        pages.insert("9".into(), vec![vec!["nine".into()]]);
        let csv = single_sheet_csv(&pages).unwrap();
        let nine = csv.find("nine").unwrap();
        let ten = csv.find("ten").unwrap();
        assert!(nine < ten, "page 9 must precede page 10");
    }

    #[test]
    fn sheet_per_page_writes_one_file_per_key() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(&two_page_map(), dir.path(), ExportMode::SheetPerPage).unwrap();
        assert!(dir.path().join("1.csv").exists());
        assert!(dir.path().join("2.csv").exists());
        let first = std::fs::read_to_string(dir.path().join("1.csv")).unwrap();
        assert!(first.starts_with("Name,Qty"));
    }

    #[test]
    fn sanitize_removes_forbidden_chars() {
        assert_eq!(sanitize_sheet_name("a:b/c\\d?e*f[g]h"), "abcdefgh");
    }

    #[test]
    fn sanitize_truncates_to_31_chars() {
        let long = "x".repeat(50);
        assert_eq!(sanitize_sheet_name(&long).chars().count(), 31);
    }

    #[test]
    fn sanitize_empty_falls_back() {
        assert_eq!(sanitize_sheet_name("[]"), "page");
        assert_eq!(sanitize_sheet_name(""), "page");
    }
}
