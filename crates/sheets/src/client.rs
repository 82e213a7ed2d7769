//! Sheets v4 client.

use crate::range::{quote_sheet_name, sheet_range};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use sheetbridge_core::{is_valid_folder_id, BridgeConfig, BridgeError, BridgeResult};
use sheetbridge_drive::DriveClient;
use sheetbridge_http::{Authenticator, GoogleHttp, Method};
use sheetbridge_sheet::{validate_anchor, CellValue, Sheet};

/// MIME type of a native Google spreadsheet.
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Size of sheets added by [`SpreadsheetClient::create_spreadsheet`].
const NEW_SHEET_ROWS: u32 = 1000;
const NEW_SHEET_COLUMNS: u32 = 26;

/// Where and how [`SpreadsheetClient::write`] puts a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Anchor cell or range in A1 notation, e.g. `"A1"` or `"C5:F20"`.
    pub range_a1: String,
    /// Clear the whole sheet before writing.
    pub replace: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            range_a1: "A1".to_string(),
            replace: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<JsonValue>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueUpdate<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesResponse {
    #[serde(default)]
    updated_range: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
}

/// Client for Google Sheets.
#[derive(Debug, Clone)]
pub struct SpreadsheetClient {
    http: GoogleHttp,
    drive: DriveClient,
}

impl SpreadsheetClient {
    /// Create a Sheets client from an authenticator and configuration.
    pub fn new(auth: Authenticator, config: &BridgeConfig) -> BridgeResult<Self> {
        Ok(Self {
            http: GoogleHttp::new("sheets", &config.endpoints.sheets, auth.clone())?,
            drive: DriveClient::new(auth, config)?,
        })
    }

    /// Read every value of one sheet.
    ///
    /// The first row becomes the header; the other rows are data, padded
    /// with empty strings to the widest row. An empty sheet gives a table
    /// with no columns.
    pub async fn read(&self, spreadsheet_id: &str, sheet_name: &str) -> BridgeResult<Sheet> {
        let token = self.http.token().await?;
        let range = quote_sheet_name(sheet_name);
        let mut url = self
            .http
            .url(&["v4", "spreadsheets", spreadsheet_id, "values", &range]);
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "FORMATTED_VALUE")
            .append_pair("majorDimension", "ROWS");

        let values: ValueRange = self
            .http
            .send_json(self.http.request(Method::GET, url, &token))
            .await?;

        let mut sheet = grid_to_sheet(values.values)?;
        sheet.set_name(sheet_name);
        tracing::debug!(
            "Read {} row(s) from {spreadsheet_id}/{sheet_name}",
            sheet.row_count()
        );
        Ok(sheet)
    }

    /// Write `sheet` (header row first) into a sheet of an existing spreadsheet.
    ///
    /// Cells are sent as text and parsed by Sheets as if typed by a user.
    /// Returns the range Sheets reports as updated.
    pub async fn write(
        &self,
        sheet: &Sheet,
        spreadsheet_id: &str,
        sheet_name: &str,
        options: &WriteOptions,
    ) -> BridgeResult<String> {
        validate_anchor(&options.range_a1).map_err(|_| {
            BridgeError::invalid_argument(format!(
                "{:?} is not a cell or range in A1 notation",
                options.range_a1
            ))
        })?;

        let token = self.http.token().await?;

        if options.replace {
            let clear = format!("{}:clear", quote_sheet_name(sheet_name));
            let url = self
                .http
                .url(&["v4", "spreadsheets", spreadsheet_id, "values", &clear]);
            self.http
                .send(self.http.request(Method::POST, url, &token).json(&json!({})))
                .await?;
            tracing::debug!("Cleared {spreadsheet_id}/{sheet_name}");
        }

        let range = sheet_range(sheet_name, &options.range_a1);
        let mut url = self
            .http
            .url(&["v4", "spreadsheets", spreadsheet_id, "values", &range]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");

        let body = ValueUpdate {
            range: &range,
            major_dimension: "ROWS",
            values: sheet.to_string_grid(),
        };
        let response: UpdateValuesResponse = self
            .http
            .send_json(self.http.request(Method::PUT, url, &token).json(&body))
            .await?;

        tracing::info!(
            "Wrote {} row(s) to {spreadsheet_id} at {}",
            sheet.row_count(),
            response.updated_range
        );
        Ok(response.updated_range)
    }

    /// Create a spreadsheet in `folder_id` and name its sheets.
    ///
    /// The first default sheet is renamed to `sheet_names[0]`; one
    /// 1000 × 26 sheet is appended per remaining name, in order. Returns the
    /// new file's id.
    pub async fn create_spreadsheet(
        &self,
        folder_id: &str,
        file_name: &str,
        sheet_names: &[&str],
    ) -> BridgeResult<String> {
        if !is_valid_folder_id(folder_id) {
            return Err(BridgeError::invalid_argument(format!(
                "{folder_id:?} is not a valid Drive folder id"
            )));
        }

        let file_id = self
            .drive
            .create_file(folder_id, file_name, SPREADSHEET_MIME_TYPE)
            .await?;
        tracing::info!("Created spreadsheet {file_name} with id {file_id} in folder {folder_id}");

        let Some((first, rest)) = sheet_names.split_first() else {
            return Ok(file_id);
        };

        let token = self.http.token().await?;
        let mut url = self.http.url(&["v4", "spreadsheets", &file_id]);
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.sheetId");
        let meta: SpreadsheetMeta = self
            .http
            .send_json(self.http.request(Method::GET, url, &token))
            .await?;
        let first_id = meta
            .sheets
            .first()
            .map(|s| s.properties.sheet_id)
            .ok_or_else(|| {
                BridgeError::unexpected_response(
                    "sheets",
                    format!("spreadsheet {file_id} has no sheets"),
                )
            })?;

        let mut requests = vec![json!({
            "updateSheetProperties": {
                "properties": {"sheetId": first_id, "title": first},
                "fields": "title"
            }
        })];
        requests.extend(rest.iter().map(|title| {
            json!({
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": {
                            "rowCount": NEW_SHEET_ROWS,
                            "columnCount": NEW_SHEET_COLUMNS
                        }
                    }
                }
            })
        }));

        let batch = format!("{file_id}:batchUpdate");
        let url = self.http.url(&["v4", "spreadsheets", &batch]);
        self.http
            .send(
                self.http
                    .request(Method::POST, url, &token)
                    .json(&json!({ "requests": requests })),
            )
            .await?;
        tracing::debug!("Named {} sheet(s) in {file_id}", sheet_names.len());

        Ok(file_id)
    }
}

/// Turn a values grid (header row first) into a table of text cells.
fn grid_to_sheet(grid: Vec<Vec<JsonValue>>) -> BridgeResult<Sheet> {
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    let mut rows = grid.into_iter().map(|row| {
        let mut cells: Vec<String> = row.into_iter().map(json_to_text).collect();
        cells.resize(width, String::new());
        cells
    });

    let Some(header) = rows.next() else {
        return Ok(Sheet::default());
    };
    let mut sheet = Sheet::new(header);
    for row in rows {
        sheet.push_row(row.into_iter().map(CellValue::String).collect())?;
    }
    Ok(sheet)
}

fn json_to_text(value: JsonValue) -> String {
    match value {
        JsonValue::String(s) => s,
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}
