use crate::book::Book;
use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use std::io::Cursor;
use std::path::Path;

/// MIME type of an Office Open XML workbook
pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn xlsx_err(e: XlsxError) -> SheetError {
    SheetError::Xlsx(e.to_string())
}

/// Decode a calamine cell the way a string-typed reader sees it.
///
/// Whole floats lose their fraction (`42.0` → `"42"`) so numbers written by
/// [`Book::to_xlsx_bytes`] come back as the same text `CellValue::as_str` gives.
fn data_to_text(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::String(b.to_string()),
        Data::Int(i) => CellValue::String(i.to_string()),
        Data::Float(f) => CellValue::String(CellValue::Float(*f).as_str()),
        Data::String(s) => CellValue::text(s),
        // Excel stores dates as days since 1899-12-30
        Data::DateTime(dt) => CellValue::String(dt.as_f64().to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

impl Sheet {
    /// Parse a sheet out of in-memory workbook bytes.
    ///
    /// Reads `sheet_name` when given, otherwise the first sheet. Row 1 becomes
    /// the header and every cell is decoded as text. Columns stay anchored at
    /// column A; trailing columns with no content at all are not recovered.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not a workbook or the sheet is missing.
    pub fn from_xlsx_bytes(bytes: &[u8], sheet_name: Option<&str>) -> Result<Self> {
        let mut workbook: Xlsx<_> =
            Xlsx::new(Cursor::new(bytes)).map_err(|e| SheetError::Xlsx(e.to_string()))?;

        let name = match sheet_name {
            Some(name) => name.to_string(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| SheetError::Xlsx("workbook has no sheets".to_string()))?,
        };

        if !workbook.sheet_names().iter().any(|s| *s == name) {
            return Err(SheetError::SheetNotFound { name });
        }

        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| SheetError::Xlsx(e.to_string()))?;

        // The range starts at the first non-empty cell; pad back to A1 so a
        // blank leading column or row keeps its position.
        let Some((first_row, first_col)) = range.start() else {
            return Ok(Sheet::with_name(&name));
        };
        let lead = first_col as usize;
        let width = lead + range.width();
        let blank_rows = (0..first_row).map(|_| vec![CellValue::Null; width]);
        let mut rows = blank_rows.chain(range.rows().map(|row| {
            let mut cells = vec![CellValue::Null; lead];
            cells.extend(row.iter().map(data_to_text));
            cells
        }));

        let Some(header) = rows.next() else {
            return Ok(Sheet::with_name(&name));
        };
        let columns: Vec<String> = header.iter().map(CellValue::as_str).collect();
        let mut sheet = Sheet::new(columns);
        sheet.set_name(&name);
        for row in rows {
            sheet.push_row(row)?;
        }

        Ok(sheet)
    }

    /// Write sheet data (header row first) to a worksheet
    fn write_to_worksheet(&self, worksheet: &mut Worksheet) -> Result<()> {
        for (col_idx, name) in self.columns().iter().enumerate() {
            let col_num = u16::try_from(col_idx)
                .map_err(|_| SheetError::Xlsx("Column index overflow".to_string()))?;
            worksheet.write_string(0, col_num, name).map_err(xlsx_err)?;
        }

        for (row_idx, row) in self.rows().enumerate() {
            let row_num = u32::try_from(row_idx + 1)
                .map_err(|_| SheetError::Xlsx("Row index overflow".to_string()))?;
            for (col_idx, cell) in row.iter().enumerate() {
                let col_num = u16::try_from(col_idx)
                    .map_err(|_| SheetError::Xlsx("Column index overflow".to_string()))?;

                match cell {
                    CellValue::Null => {} // Leave empty
                    CellValue::Bool(b) => {
                        worksheet
                            .write_boolean(row_num, col_num, *b)
                            .map_err(xlsx_err)?;
                    }
                    CellValue::Int(i) => {
                        // Note: Excel stores all numbers as f64, so integers > 2^53
                        // may lose precision
                        worksheet
                            .write_number(row_num, col_num, *i as f64)
                            .map_err(xlsx_err)?;
                    }
                    CellValue::Float(f) => {
                        worksheet
                            .write_number(row_num, col_num, *f)
                            .map_err(xlsx_err)?;
                    }
                    CellValue::String(s) => {
                        worksheet
                            .write_string(row_num, col_num, s)
                            .map_err(xlsx_err)?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl Book {
    fn to_workbook(&self) -> Result<Workbook> {
        let mut workbook = Workbook::new();

        for (name, sheet) in self.sheets() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name).map_err(xlsx_err)?;
            sheet.write_to_worksheet(worksheet)?;
        }

        Ok(workbook)
    }

    /// Serialize every sheet into one in-memory workbook, one worksheet each
    ///
    /// # Errors
    ///
    /// Returns error if a sheet name is not a legal worksheet name.
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = self.to_workbook()?;
        workbook.save_to_buffer().map_err(xlsx_err)
    }

    /// Save the book to an Excel file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or written.
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut workbook = self.to_workbook()?;
        workbook.save(path.as_ref()).map_err(xlsx_err)
    }
}
