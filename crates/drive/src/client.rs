//! Drive v3 file transfers.

use crate::decode::decode_text;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sheetbridge_core::{
    are_valid_tables, is_valid_folder_id, is_valid_workbook_name, BridgeConfig, BridgeError,
    BridgeResult,
};
use sheetbridge_http::{Authenticator, GoogleHttp, Method, RelatedBody};
use sheetbridge_sheet::{Book, CsvOptions, Sheet, XLSX_MIME_TYPE};

/// MIME type of delimited uploads.
pub const CSV_MIME_TYPE: &str = "text/csv";

const FILE_FIELDS: &str = "id,name,mimeType";

/// A file entry as returned by `files.list` / `files.create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

/// Client for Google Drive.
#[derive(Debug, Clone)]
pub struct DriveClient {
    http: GoogleHttp,
    config: BridgeConfig,
}

impl DriveClient {
    /// Create a Drive client from an authenticator and configuration.
    pub fn new(auth: Authenticator, config: &BridgeConfig) -> BridgeResult<Self> {
        Ok(Self {
            http: GoogleHttp::new("drive", &config.endpoints.drive, auth)?,
            config: config.clone(),
        })
    }

    /// Write `book` as an `.xlsx` workbook and upload it into `folder_id`.
    ///
    /// Returns the new file's id. Validation happens before anything is
    /// written, in this order: tables, folder id, file name.
    pub async fn upload_workbook(
        &self,
        book: &Book,
        folder_id: &str,
        file_name: &str,
    ) -> BridgeResult<String> {
        if !are_valid_tables(book) {
            return Err(BridgeError::invalid_argument(
                "tables must be a non-empty set of sheets with legal names and unique columns",
            ));
        }
        check_folder_id(folder_id)?;
        if !is_valid_workbook_name(file_name) {
            return Err(BridgeError::invalid_argument(format!(
                "{file_name:?} is not a valid workbook name"
            )));
        }

        let path = self.config.staging_path(file_name)?;
        book.save_as_xlsx(&path)?;
        let content = tokio::fs::read(&path).await?;

        let file_id = self
            .upload(folder_id, file_name, XLSX_MIME_TYPE, &content)
            .await?;
        tracing::info!(
            "Uploaded {} sheet(s) to workbook {file_name} with id {file_id} in folder {folder_id}",
            book.sheet_count()
        );
        Ok(file_id)
    }

    /// Download an `.xlsx` file and read one sheet (the first when `sheet_name` is `None`).
    ///
    /// Every cell comes back as text.
    pub async fn download_workbook(
        &self,
        file_id: &str,
        sheet_name: Option<&str>,
    ) -> BridgeResult<Sheet> {
        let content = match self.download(file_id).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Download of {file_id} failed: {e}");
                return Err(BridgeError::remote_read(file_id));
            }
        };
        Ok(Sheet::from_xlsx_bytes(&content, sheet_name)?)
    }

    /// Write `sheet` as comma-separated text and upload it into `folder_id`.
    ///
    /// `file_name` must be a plain file name; it is staged inside the
    /// configured staging directory.
    pub async fn upload_delimited(
        &self,
        sheet: &Sheet,
        file_name: &str,
        folder_id: &str,
    ) -> BridgeResult<String> {
        check_folder_id(folder_id)?;
        let path = self.config.staging_path(file_name)?;

        sheet.save_as_csv(&path, &CsvOptions::default())?;
        let content = tokio::fs::read(&path).await?;

        let file_id = self
            .upload(folder_id, file_name, CSV_MIME_TYPE, &content)
            .await?;
        tracing::info!("Uploaded {file_name} with id {file_id} in folder {folder_id}");
        Ok(file_id)
    }

    /// Download a delimited text file and parse it; every cell comes back as text.
    ///
    /// Any failure along the way (download or parse) is reported as
    /// [`BridgeError::RemoteRead`].
    pub async fn download_delimited(
        &self,
        file_id: &str,
        options: CsvOptions,
    ) -> BridgeResult<Sheet> {
        let parsed = match self.download(file_id).await {
            Ok(content) => Sheet::from_csv_str(&decode_text(&content), options)
                .map_err(BridgeError::from),
            Err(e) => Err(e),
        };
        parsed.map_err(|e| {
            tracing::warn!("Reading {file_id} failed: {e}");
            BridgeError::remote_read(file_id)
        })
    }

    /// List the non-trashed files directly inside `folder_id`, following every page.
    pub async fn list_files(&self, folder_id: &str) -> BridgeResult<Vec<DriveFile>> {
        check_folder_id(folder_id)?;

        let token = self.http.token().await?;
        let query = format!("'{folder_id}' in parents and trashed = false");
        let fields = format!("nextPageToken,files({FILE_FIELDS})");
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.http.url(&["drive", "v3", "files"]);
            url.query_pairs_mut()
                .append_pair("q", &query)
                .append_pair("fields", &fields)
                .append_pair("pageSize", "1000")
                .append_pair("supportsAllDrives", "true")
                .append_pair("includeItemsFromAllDrives", "true");
            if let Some(page) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", page);
            }

            let page: FileList = self
                .http
                .send_json(self.http.request(Method::GET, url, &token))
                .await?;
            files.extend(page.files);

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        tracing::debug!("Folder {folder_id} holds {} file(s)", files.len());
        Ok(files)
    }

    /// Create an empty file (metadata only) in `folder_id`; returns its id.
    ///
    /// With a Google Apps MIME type this creates a native document, e.g. a
    /// spreadsheet for `application/vnd.google-apps.spreadsheet`.
    pub async fn create_file(
        &self,
        folder_id: &str,
        name: &str,
        mime_type: &str,
    ) -> BridgeResult<String> {
        let token = self.http.token().await?;
        let mut url = self.http.url(&["drive", "v3", "files"]);
        url.query_pairs_mut()
            .append_pair("fields", "id")
            .append_pair("supportsAllDrives", "true");

        let metadata = json!({
            "name": name,
            "mimeType": mime_type,
            "parents": [folder_id],
        });
        let file: DriveFile = self
            .http
            .send_json(self.http.request(Method::POST, url, &token).json(&metadata))
            .await?;
        Ok(file.id)
    }

    async fn upload(
        &self,
        folder_id: &str,
        file_name: &str,
        mime_type: &str,
        content: &[u8],
    ) -> BridgeResult<String> {
        let token = self.http.token().await?;
        let mut url = self.http.url(&["upload", "drive", "v3", "files"]);
        url.query_pairs_mut()
            .append_pair("uploadType", "multipart")
            .append_pair("fields", "id")
            .append_pair("supportsAllDrives", "true");

        let metadata = json!({
            "name": file_name,
            "parents": [folder_id],
        });
        let body = RelatedBody::new(&metadata, mime_type, content)?;
        let request = self
            .http
            .request(Method::POST, url, &token)
            .header("Content-Type", body.content_type())
            .body(body.into_bytes());

        let file: DriveFile = self.http.send_json(request).await?;
        Ok(file.id)
    }

    async fn download(&self, file_id: &str) -> BridgeResult<Vec<u8>> {
        let token = self.http.token().await?;
        let mut url = self.http.url(&["drive", "v3", "files", file_id]);
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("supportsAllDrives", "true");
        self.http
            .send_bytes(self.http.request(Method::GET, url, &token))
            .await
    }
}

fn check_folder_id(folder_id: &str) -> BridgeResult<()> {
    if is_valid_folder_id(folder_id) {
        Ok(())
    } else {
        Err(BridgeError::invalid_argument(format!(
            "{folder_id:?} is not a valid Drive folder id"
        )))
    }
}
