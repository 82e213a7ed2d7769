use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use std::collections::HashSet;

/// A named table: ordered column names plus rows of cells (row-major storage).
///
/// Every row holds exactly one cell per column. Column names are not forced
/// unique here because remote sources may hand back duplicate headers; use
/// [`Sheet::has_unique_columns`] before writing somewhere that cares.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Create an empty sheet with the given columns
    #[must_use]
    pub fn new<S: Into<String>>(columns: Vec<S>) -> Self {
        Sheet {
            name: "Sheet1".to_string(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Create an empty sheet with a name and no columns
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Create a sheet from column names and rows
    ///
    /// # Errors
    ///
    /// Returns `SheetError::LengthMismatch` if any row has a different width
    /// than the header.
    pub fn from_rows<S, T>(columns: Vec<S>, rows: Vec<Vec<T>>) -> Result<Self>
    where
        S: Into<String>,
        T: Into<CellValue>,
    {
        let mut sheet = Sheet::new(columns);
        for row in rows {
            sheet.push_row(row)?;
        }
        Ok(sheet)
    }

    /// Create a sheet from a 2D grid whose first row holds the headers
    ///
    /// # Errors
    ///
    /// Returns `SheetError::LengthMismatch` for ragged rows.
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Result<Self> {
        let mut grid = data.into_iter();
        let Some(header) = grid.next() else {
            return Ok(Sheet::with_name("Sheet1"));
        };
        let columns: Vec<String> = header
            .into_iter()
            .map(|c| Into::<CellValue>::into(c).as_str())
            .collect();
        Sheet::from_rows(columns, grid.collect())
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the column names in order
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get the number of data rows (the header is not a row)
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if the sheet has no data rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when no column name appears twice
    #[must_use]
    pub fn has_unique_columns(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.columns.len());
        self.columns.iter().all(|c| seen.insert(c.as_str()))
    }

    // ===== Row Operations =====

    /// Get a row by index
    pub fn row(&self, index: usize) -> Result<&[CellValue]> {
        self.rows
            .get(index)
            .map(Vec::as_slice)
            .ok_or(SheetError::RowIndexOutOfBounds {
                index,
                count: self.rows.len(),
            })
    }

    /// Iterate over the data rows
    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Append a row
    ///
    /// # Errors
    ///
    /// Returns `SheetError::LengthMismatch` if the row width differs from the
    /// column count.
    pub fn push_row<T: Into<CellValue>>(&mut self, row: Vec<T>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(SheetError::LengthMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row.into_iter().map(Into::into).collect());
        Ok(())
    }

    // ===== Column Operations =====

    /// Position of a column by name (first match)
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Get all values of a column by name
    pub fn column(&self, name: &str) -> Result<Vec<&CellValue>> {
        let index = self
            .column_index(name)
            .ok_or_else(|| SheetError::ColumnNotFound {
                name: name.to_string(),
            })?;
        Ok(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Append `_<suffix>` to every column name not listed in `keep`.
    ///
    /// Used to tell two tables apart before joining them on a shared key.
    pub fn suffix_columns(&mut self, suffix: &str, keep: &[&str]) {
        for column in &mut self.columns {
            if keep.contains(&column.as_str()) {
                continue;
            }
            *column = format!("{column}_{suffix}");
        }
    }

    // ===== Conversion =====

    /// Copy of the sheet with every non-null cell cast to its string form
    #[must_use]
    pub fn to_string_cells(&self) -> Sheet {
        Sheet {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(CellValue::to_string_cell).collect())
                .collect(),
        }
    }

    /// Header row followed by data rows, every cell string-cast (`Null` → `""`)
    #[must_use]
    pub fn to_string_grid(&self) -> Vec<Vec<String>> {
        let mut grid = Vec::with_capacity(self.rows.len() + 1);
        grid.push(self.columns.clone());
        for row in &self.rows {
            grid.push(row.iter().map(CellValue::as_str).collect());
        }
        grid
    }

    /// Consume the sheet into its columns and rows
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<CellValue>>) {
        (self.columns, self.rows)
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Sheet::with_name("Sheet1")
    }
}
