//! Shared helpers for Drive integration tests.

#![allow(dead_code)]

use sheetbridge_core::{ApiEndpoints, BridgeConfig, Credentials};
use sheetbridge_drive::DriveClient;
use sheetbridge_http::Authenticator;
use std::path::Path;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const FOLDER_ID: &str = "1AbCdEfGhIjKlMnOpQrStUvWxYz";
pub const FILE_ID: &str = "uploaded-file-1";

/// Build a client pointed at `server`, staging into `staging_dir`.
pub fn drive_client(server: &MockServer, staging_dir: &Path) -> DriveClient {
    let config = BridgeConfig {
        endpoints: ApiEndpoints::single(&server.uri()),
        staging_dir: staging_dir.to_path_buf(),
        ..BridgeConfig::default()
    };
    let auth = Authenticator::new(Credentials::AccessToken("ya29.test".into()), &config.endpoints)
        .unwrap();
    DriveClient::new(auth, &config).unwrap()
}

/// Split a `multipart/related` request into its metadata and media parts.
pub fn related_parts(request: &Request) -> (serde_json::Value, Vec<u8>) {
    let content_type = request
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    let boundary = content_type.split("boundary=").nth(1).unwrap();
    let delimiter = format!("--{boundary}\r\n").into_bytes();
    let closing = format!("\r\n--{boundary}--").into_bytes();

    let body = &request.body;
    let second = find(body, &delimiter[..], 1).unwrap();
    let first_end = second - 2;
    let metadata_start = find(&body[..first_end], b"\r\n\r\n", 0).unwrap() + 4;
    let metadata = serde_json::from_slice(&body[metadata_start..first_end]).unwrap();

    let part = &body[second + delimiter.len()..];
    let media_start = find(part, b"\r\n\r\n", 0).unwrap() + 4;
    let media_end = find(part, &closing[..], 0).unwrap();
    (metadata, part[media_start..media_end].to_vec())
}

fn find(haystack: &[u8], needle: &[u8], skip: usize) -> Option<usize> {
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(|(_, w)| *w == needle)
        .map(|(i, _)| i)
        .nth(skip)
}

/// Stores the media part of every upload and answers with a fixed id.
struct StoreUpload(Arc<Mutex<Vec<u8>>>);

impl Respond for StoreUpload {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let (_, media) = related_parts(request);
        *self.0.lock().unwrap() = media;
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": FILE_ID}))
    }
}

/// Serves back whatever was last uploaded.
struct ServeUpload(Arc<Mutex<Vec<u8>>>);

impl Respond for ServeUpload {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_bytes(self.0.lock().unwrap().clone())
    }
}

/// Mount a fake Drive that echoes uploaded bytes back on download.
pub async fn mount_echo_drive(server: &MockServer) {
    let stored = Arc::new(Mutex::new(Vec::new()));
    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .respond_with(StoreUpload(Arc::clone(&stored)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(format!("^/drive/v3/files/{FILE_ID}$")))
        .respond_with(ServeUpload(stored))
        .mount(server)
        .await;
}
