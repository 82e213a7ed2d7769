//! # sheetbridge-sheets
//!
//! Read and write whole tables in Google Sheets, and create new
//! spreadsheets inside a Drive folder.

mod client;
mod range;

pub use client::{SpreadsheetClient, WriteOptions, SPREADSHEET_MIME_TYPE};
pub use range::{quote_sheet_name, sheet_range};
