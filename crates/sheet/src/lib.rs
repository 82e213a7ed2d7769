//! Sheet/Book module for sheetbridge
//!
//! An in-memory table model shared by every remote transfer: a [`Sheet`] is a
//! named table with ordered column names and rows of [`CellValue`]s, a
//! [`Book`] is an ordered set of named sheets (one workbook).
//!
//! # Examples
//!
//! ## Creating a sheet from data
//!
//! ```
//! use sheetbridge_sheet::Sheet;
//!
//! let sheet = Sheet::from_data(vec![
//!     vec!["Name", "Age", "City"],
//!     vec!["Alice", "30", "NYC"],
//!     vec!["Bob", "25", "LA"],
//! ]).unwrap();
//!
//! assert_eq!(sheet.columns(), &["Name", "Age", "City"]);
//! assert_eq!(sheet.row_count(), 2);
//! ```
//!
//! ## Loading from CSV
//!
//! ```
//! use sheetbridge_sheet::{CsvOptions, Sheet};
//!
//! let options = CsvOptions::default().with_delimiter(b';');
//! let sheet = Sheet::from_csv_str("a;b\n1;2", options).unwrap();
//! assert_eq!(sheet.col_count(), 2);
//! ```
//!
//! ## Working with books
//!
//! ```
//! use sheetbridge_sheet::{Book, Sheet};
//!
//! let mut book = Book::new();
//! book.add_sheet("Data", Sheet::new(vec!["id"])).unwrap();
//! book.add_sheet("Summary", Sheet::new(vec!["total"])).unwrap();
//!
//! assert_eq!(book.sheet_count(), 2);
//! let bytes = book.to_xlsx_bytes().unwrap();
//! assert!(!bytes.is_empty());
//! ```

mod a1_notation;
mod book;
mod cell;
mod csv;
mod error;
mod json;
mod sheet;
mod xlsx;

/// Re-export A1 notation helpers.
pub use a1_notation::{column_index_to_letters, parse_a1, validate_anchor};
/// Re-export book type.
pub use book::Book;
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export CSV options.
pub use csv::CsvOptions;
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export sheet type.
pub use sheet::Sheet;
/// Re-export the workbook MIME type.
pub use xlsx::XLSX_MIME_TYPE;
