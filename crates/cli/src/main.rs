//! # sheetbridge-cli
//!
//! Command-line interface for moving tables between local CSV files,
//! Google Sheets, Google Drive and BigQuery.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use sheetbridge_alert::{ChatNotifier, Delivery};
use sheetbridge_core::{is_valid_folder_id, is_valid_workbook_name, BridgeConfig, Credentials};
use sheetbridge_drive::DriveClient;
use sheetbridge_http::Authenticator;
use sheetbridge_sheet::{Book, CellValue, CsvOptions, Sheet};
use sheetbridge_sheets::{SpreadsheetClient, WriteOptions};
use sheetbridge_warehouse::WarehouseClient;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// sheetbridge - move tables between Sheets, Drive and BigQuery
#[derive(Parser)]
#[command(name = "sheetbridge")]
#[command(author, version, about = "Move tables between Google Sheets, Drive and BigQuery", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format for tables printed or saved
    #[arg(short, long, global = true, default_value = "csv")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Output format for tables.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// CSV with header row (default)
    #[default]
    Csv,
    /// JSON array of records
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Read a sheet of a spreadsheet
    SheetsRead {
        spreadsheet_id: String,
        sheet: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a CSV file into a sheet of a spreadsheet
    SheetsWrite {
        spreadsheet_id: String,
        sheet: String,
        input: PathBuf,
        /// Anchor cell or range in A1 notation
        #[arg(long, default_value = "A1")]
        range: String,
        /// Keep existing content instead of clearing the sheet first
        #[arg(long)]
        keep: bool,
    },
    /// Create a spreadsheet in a Drive folder
    SheetsCreate {
        folder_id: String,
        name: String,
        /// Sheet names, in order (repeatable)
        #[arg(long = "sheet")]
        sheets: Vec<String>,
    },
    /// Upload CSV files as the sheets of one .xlsx workbook
    DriveUploadXlsx {
        folder_id: String,
        file_name: String,
        /// Sheets as NAME=CSV_PATH
        #[arg(required = true, value_name = "NAME=CSV")]
        sheets: Vec<String>,
        /// Parse numbers and booleans instead of keeping text
        #[arg(long)]
        typed: bool,
    },
    /// Download one sheet of an .xlsx workbook
    DriveDownloadXlsx {
        file_id: String,
        /// Sheet to read (first sheet by default)
        #[arg(long)]
        sheet: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upload a CSV file
    DriveUploadCsv {
        folder_id: String,
        file_name: String,
        input: PathBuf,
    },
    /// Download a delimited text file
    DriveDownloadCsv {
        file_id: String,
        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,
        /// Zero-based row holding the column names
        #[arg(long, default_value_t = 0, conflicts_with = "no_header")]
        header_row: usize,
        /// The file has no header row
        #[arg(long)]
        no_header: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the files of a Drive folder
    DriveList { folder_id: String },
    /// Replace a BigQuery table with the contents of a CSV file
    BqLoad {
        project_id: String,
        dataset_id: String,
        table: String,
        input: PathBuf,
        /// Parse numbers and booleans instead of loading text
        #[arg(long)]
        typed: bool,
    },
    /// Run a BigQuery query
    BqQuery {
        project_id: String,
        query: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Send a Google Chat alert
    Alert { text: String },
    /// Check the shape of a Drive folder id
    ValidateFolderId { folder_id: String },
    /// Check an .xlsx file name
    ValidateWorkbookName { name: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let config = BridgeConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    run(cli.command, &config, cli.format).await
}

async fn run(command: Command, config: &BridgeConfig, format: OutputFormat) -> Result<ExitCode> {
    match command {
        Command::SheetsRead {
            spreadsheet_id,
            sheet,
            output,
        } => {
            let client = SpreadsheetClient::new(authenticator(config)?, config)?;
            let table = client.read(&spreadsheet_id, &sheet).await?;
            emit_sheet(&table, format, output.as_deref())?;
        }
        Command::SheetsWrite {
            spreadsheet_id,
            sheet,
            input,
            range,
            keep,
        } => {
            let table = read_csv(&input, false)?;
            let client = SpreadsheetClient::new(authenticator(config)?, config)?;
            let options = WriteOptions {
                range_a1: range,
                replace: !keep,
            };
            let updated = client
                .write(&table, &spreadsheet_id, &sheet, &options)
                .await?;
            println!("{} {}", "Updated".green().bold(), updated);
        }
        Command::SheetsCreate {
            folder_id,
            name,
            sheets,
        } => {
            let client = SpreadsheetClient::new(authenticator(config)?, config)?;
            let names: Vec<&str> = sheets.iter().map(String::as_str).collect();
            let id = client.create_spreadsheet(&folder_id, &name, &names).await?;
            println!("{id}");
        }
        Command::DriveUploadXlsx {
            folder_id,
            file_name,
            sheets,
            typed,
        } => {
            let mut book = Book::new();
            for spec in &sheets {
                let (name, path) = spec.split_once('=').with_context(|| {
                    format!("Invalid sheet '{spec}'. Expected NAME=CSV_PATH format")
                })?;
                book.add_sheet(name, read_csv(Path::new(path), typed)?)?;
            }
            let client = DriveClient::new(authenticator(config)?, config)?;
            let id = client.upload_workbook(&book, &folder_id, &file_name).await?;
            println!("{id}");
        }
        Command::DriveDownloadXlsx {
            file_id,
            sheet,
            output,
        } => {
            let client = DriveClient::new(authenticator(config)?, config)?;
            let table = client.download_workbook(&file_id, sheet.as_deref()).await?;
            emit_sheet(&table, format, output.as_deref())?;
        }
        Command::DriveUploadCsv {
            folder_id,
            file_name,
            input,
        } => {
            let table = read_csv(&input, false)?;
            let client = DriveClient::new(authenticator(config)?, config)?;
            let id = client
                .upload_delimited(&table, &file_name, &folder_id)
                .await?;
            println!("{id}");
        }
        Command::DriveDownloadCsv {
            file_id,
            delimiter,
            header_row,
            no_header,
            output,
        } => {
            let delimiter = u8::try_from(delimiter)
                .ok()
                .filter(u8::is_ascii)
                .with_context(|| format!("Delimiter '{delimiter}' must be a single ASCII character"))?;
            let options = CsvOptions::default()
                .with_delimiter(delimiter)
                .with_header_row((!no_header).then_some(header_row));
            let client = DriveClient::new(authenticator(config)?, config)?;
            let table = client.download_delimited(&file_id, options).await?;
            emit_sheet(&table, format, output.as_deref())?;
        }
        Command::DriveList { folder_id } => {
            let client = DriveClient::new(authenticator(config)?, config)?;
            for file in client.list_files(&folder_id).await? {
                println!("{}\t{}\t{}", file.id, file.name.cyan(), file.mime_type.dimmed());
            }
        }
        Command::BqLoad {
            project_id,
            dataset_id,
            table,
            input,
            typed,
        } => {
            let data = read_csv(&input, typed)?;
            let client = WarehouseClient::new(authenticator(config)?, config)?;
            let job = client.load(&project_id, &dataset_id, &table, &data).await?;
            println!(
                "{} {} ({} rows)",
                "Loaded".green().bold(),
                job.job_id,
                job.output_rows.unwrap_or(data.row_count() as u64)
            );
        }
        Command::BqQuery {
            project_id,
            query,
            output,
        } => {
            let client = WarehouseClient::new(authenticator(config)?, config)?;
            let table = client.query(&query, &project_id).await?;
            emit_sheet(&table, format, output.as_deref())?;
        }
        Command::Alert { text } => {
            let notifier = ChatNotifier::from_config(config)?;
            match notifier.notify(&text).await {
                Delivery::Sent { status } => println!("{} ({status})", "Sent".green().bold()),
                Delivery::Failed { reason } => {
                    eprintln!("{} {reason}", "Not delivered:".yellow().bold());
                }
            }
        }
        Command::ValidateFolderId { folder_id } => {
            return Ok(verdict(is_valid_folder_id(&folder_id)));
        }
        Command::ValidateWorkbookName { name } => {
            return Ok(verdict(is_valid_workbook_name(&name)));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn authenticator(config: &BridgeConfig) -> Result<Authenticator> {
    let credentials = Credentials::from_env().context("Failed to load Google credentials")?;
    Ok(Authenticator::new(credentials, &config.endpoints)?)
}

/// Read a local CSV file, optionally parsing cell types.
fn read_csv(path: &Path, typed: bool) -> Result<Sheet> {
    let sheet = Sheet::from_csv(path, CsvOptions::default())
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    if !typed {
        return Ok(sheet);
    }

    let name = sheet.name().to_string();
    let (columns, rows) = sheet.into_parts();
    let rows: Vec<Vec<CellValue>> = rows
        .into_iter()
        .map(|row| row.into_iter().map(parse_cell).collect())
        .collect();
    let mut typed_sheet = Sheet::from_rows(columns, rows)?;
    typed_sheet.set_name(&name);
    Ok(typed_sheet)
}

/// Parse a text cell into the narrowest cell type.
fn parse_cell(cell: CellValue) -> CellValue {
    let CellValue::String(s) = cell else {
        return cell;
    };
    if s.eq_ignore_ascii_case("true") {
        CellValue::Bool(true)
    } else if s.eq_ignore_ascii_case("false") {
        CellValue::Bool(false)
    } else if let Ok(n) = s.parse::<i64>() {
        CellValue::Int(n)
    } else if let Ok(f) = s.parse::<f64>() {
        CellValue::Float(f)
    } else {
        CellValue::String(s)
    }
}

/// Print a table to stdout or save it to a file.
fn emit_sheet(sheet: &Sheet, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let rendered = match format {
        OutputFormat::Csv => sheet.to_csv_string(),
        OutputFormat::Json => sheet.to_json_string()? + "\n",
    };
    match output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write file: {}", path.display()))?,
        None => std::io::stdout().write_all(rendered.as_bytes())?,
    }
    Ok(())
}

fn verdict(valid: bool) -> ExitCode {
    if valid {
        println!("{}", "valid".green().bold());
        ExitCode::SUCCESS
    } else {
        println!("{}", "invalid".red().bold());
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell(CellValue::from("42")), CellValue::Int(42));
        assert_eq!(parse_cell(CellValue::from("4.5")), CellValue::Float(4.5));
        assert_eq!(parse_cell(CellValue::from("TRUE")), CellValue::Bool(true));
        assert_eq!(parse_cell(CellValue::from("Cali")), CellValue::from("Cali"));
        assert_eq!(parse_cell(CellValue::Null), CellValue::Null);
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "sheetbridge",
            "drive-download-csv",
            "abc",
            "--delimiter",
            ";",
            "--header-row",
            "2",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::DriveDownloadCsv {
                delimiter: ';',
                header_row: 2,
                no_header: false,
                ..
            }
        ));
    }

    #[test]
    fn test_header_flags_conflict() {
        let result = Cli::try_parse_from([
            "sheetbridge",
            "drive-download-csv",
            "abc",
            "--header-row",
            "1",
            "--no-header",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_read_csv_typed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "id,ok\n1,true\n").unwrap();

        let sheet = read_csv(&path, true).unwrap();
        assert_eq!(sheet.row(0).unwrap(), &[CellValue::Int(1), CellValue::Bool(true)]);
        let sheet = read_csv(&path, false).unwrap();
        assert_eq!(sheet.row(0).unwrap()[0], CellValue::from("1"));
    }
}
