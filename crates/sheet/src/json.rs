//! JSON output for Sheet: an array of objects `[{"name": "Alice", "age": 30}, ...]`

use crate::cell::CellValue;
use crate::error::Result;
use crate::sheet::Sheet;
use indexmap::IndexMap;

impl Sheet {
    /// Convert to a list of records, one per row, keyed by column name.
    ///
    /// Column order is preserved in each record. With duplicate column names
    /// the last cell wins.
    #[must_use]
    pub fn to_json_records(&self) -> Vec<IndexMap<String, CellValue>> {
        self.rows()
            .map(|row| {
                self.columns()
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    /// Serialize as a pretty JSON array of objects
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_json_records())?)
    }
}
