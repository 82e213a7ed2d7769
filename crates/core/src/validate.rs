//! Input validators. Pure functions, no side effects.

use regex::Regex;
use sheetbridge_sheet::Book;

/// Characters Excel refuses in worksheet names.
const ILLEGAL_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];
const MAX_SHEET_NAME_LEN: usize = 31;

fn folder_id_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{25,}$").expect("valid regex"))
}

fn workbook_name_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^[^\\/:*?"<>|]+\.xlsx$"#).expect("valid regex"))
}

/// True when `s` looks like a Drive folder id: 25 or more of `A-Z a-z 0-9 _ -`.
///
/// Only the shape is checked; the folder may still not exist.
#[must_use]
pub fn is_valid_folder_id(s: &str) -> bool {
    folder_id_regex().is_match(s)
}

/// True when the book can be written as a workbook.
///
/// The book must hold at least one sheet, every sheet name must be a legal
/// worksheet name and no sheet may repeat a column name.
#[must_use]
pub fn are_valid_tables(book: &Book) -> bool {
    if book.is_empty() {
        return false;
    }
    book.sheets()
        .all(|(name, sheet)| is_valid_sheet_name(name) && sheet.has_unique_columns())
}

/// True for a legal worksheet name: 1 to 31 characters, none of `[]:*?/\`.
#[must_use]
pub fn is_valid_sheet_name(name: &str) -> bool {
    let len = name.chars().count();
    (1..=MAX_SHEET_NAME_LEN).contains(&len) && !name.contains(ILLEGAL_SHEET_CHARS)
}

/// True when `name` is a usable `.xlsx` file name.
#[must_use]
pub fn is_valid_workbook_name(name: &str) -> bool {
    workbook_name_regex().is_match(name)
}
