//! # sheetbridge-drive
//!
//! Move tables in and out of Google Drive as `.xlsx` workbooks or
//! delimited text files.
//!
//! Uploads are staged on local disk first (`<staging_dir>/<file name>`) and
//! the staged file is left in place afterwards.

mod client;
mod decode;

pub use client::{DriveClient, DriveFile, CSV_MIME_TYPE};
pub use decode::decode_text;
