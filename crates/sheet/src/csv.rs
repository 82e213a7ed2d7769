use crate::cell::CellValue;
use crate::error::Result;
use crate::sheet::Sheet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// CSV reader/writer options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Zero-based line holding the headers; lines above it are skipped.
    /// `None` means there is no header and columns are named `0`, `1`, ...
    pub header_row: Option<usize>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            quote: b'"',
            header_row: Some(0),
        }
    }
}

impl CsvOptions {
    /// Set the delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set which line holds the headers
    #[must_use]
    pub fn with_header_row(mut self, header_row: Option<usize>) -> Self {
        self.header_row = header_row;
        self
    }
}

impl Sheet {
    /// Load a sheet from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P, options: CsvOptions) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_csv_reader(BufReader::new(file), options)
    }

    /// Load a sheet from a CSV string
    pub fn from_csv_str(content: &str, options: CsvOptions) -> Result<Self> {
        Self::from_csv_reader(content.as_bytes(), options)
    }

    /// Load a sheet from a reader. Every cell is kept as text; empty fields
    /// become `Null`.
    pub fn from_csv_reader<R: Read>(reader: R, options: CsvOptions) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false) // We handle headers ourselves
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        for result in csv_reader.records() {
            records.push(result?);
        }

        let skip = options.header_row.unwrap_or(0);
        let mut lines = records.into_iter().skip(skip);

        let (columns, first_data) = match options.header_row {
            Some(_) => match lines.next() {
                Some(header) => (header.iter().map(str::to_string).collect::<Vec<_>>(), None),
                None => return Ok(Sheet::with_name("Sheet1")),
            },
            None => match lines.next() {
                Some(first) => ((0..first.len()).map(|i| i.to_string()).collect(), Some(first)),
                None => return Ok(Sheet::with_name("Sheet1")),
            },
        };

        let width = columns.len();
        let mut sheet = Sheet::new(columns);
        for record in first_data.into_iter().chain(lines) {
            let mut row: Vec<CellValue> = record.iter().take(width).map(CellValue::text).collect();
            row.resize(width, CellValue::Null);
            sheet.push_row(row)?;
        }

        Ok(sheet)
    }

    /// Save the sheet to a CSV file (header row included, no index column)
    pub fn save_as_csv<P: AsRef<Path>>(&self, path: P, options: &CsvOptions) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        self.write_csv(writer, options)
    }

    /// Write the sheet to a writer as CSV
    pub fn write_csv<W: Write>(&self, writer: W, options: &CsvOptions) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .from_writer(writer);

        csv_writer.write_record(self.columns())?;
        for row in self.rows() {
            let record: Vec<String> = row.iter().map(CellValue::as_str).collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Convert the sheet to a CSV string
    #[must_use]
    pub fn to_csv_string(&self) -> String {
        let mut buffer = Vec::new();
        // Ignore errors for string conversion
        let _ = self.write_csv(&mut buffer, &CsvOptions::default());
        String::from_utf8_lossy(&buffer).to_string()
    }
}
