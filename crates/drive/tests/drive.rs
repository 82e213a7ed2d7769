//! Drive client tests against a mock Drive API.

mod common;
use common::*;

use sheetbridge_core::BridgeError;
use sheetbridge_sheet::{Book, CellValue, CsvOptions, Sheet, XLSX_MIME_TYPE};
use tempfile::tempdir;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn balances() -> Sheet {
    Sheet::from_rows(
        vec!["identificacion", "saldo", "activo"],
        vec![
            vec![CellValue::from("10"), CellValue::Int(1500), CellValue::Bool(true)],
            vec![CellValue::from("11"), CellValue::Float(20.5), CellValue::Null],
        ],
    )
    .unwrap()
}

// ===== Round trips =====

#[tokio::test]
async fn test_delimited_round_trip_is_string_cast() {
    let server = MockServer::start().await;
    mount_echo_drive(&server).await;
    let staging = tempdir().unwrap();
    let drive = drive_client(&server, staging.path());

    let sheet = balances();
    let id = drive
        .upload_delimited(&sheet, "saldos.csv", FOLDER_ID)
        .await
        .unwrap();
    assert_eq!(id, FILE_ID);

    let back = drive
        .download_delimited(&id, CsvOptions::default())
        .await
        .unwrap();
    assert_eq!(back, sheet.to_string_cells());
}

#[tokio::test]
async fn test_workbook_round_trip_is_string_cast() {
    let server = MockServer::start().await;
    mount_echo_drive(&server).await;
    let staging = tempdir().unwrap();
    let drive = drive_client(&server, staging.path());

    let summary = Sheet::from_data(vec![vec!["total"], vec!["2"]]).unwrap();
    let book = Book::from_sheets([("Saldos", balances()), ("Resumen", summary)]).unwrap();
    let id = drive
        .upload_workbook(&book, FOLDER_ID, "cierre.xlsx")
        .await
        .unwrap();

    let mut expected = balances().to_string_cells();
    expected.set_name("Saldos");
    assert_eq!(drive.download_workbook(&id, None).await.unwrap(), expected);

    let resumen = drive.download_workbook(&id, Some("Resumen")).await.unwrap();
    assert_eq!(resumen.columns(), &["total"]);
    assert_eq!(resumen.row(0).unwrap()[0], CellValue::from("2"));
}

// ===== Upload requests =====

#[tokio::test]
async fn test_workbook_upload_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .and(query_param("uploadType", "multipart"))
        .and(header("authorization", "Bearer ya29.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "x1"})))
        .expect(1)
        .mount(&server)
        .await;

    let staging = tempdir().unwrap();
    let drive = drive_client(&server, staging.path());
    let book = Book::from_sheets([("Saldos", balances())]).unwrap();
    drive
        .upload_workbook(&book, FOLDER_ID, "cierre.xlsx")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let (metadata, media) = related_parts(&requests[0]);
    assert_eq!(
        metadata,
        serde_json::json!({"name": "cierre.xlsx", "parents": [FOLDER_ID]})
    );
    assert!(String::from_utf8_lossy(&requests[0].body).contains(XLSX_MIME_TYPE));
    // xlsx files are zip archives
    assert_eq!(&media[..2], b"PK");

    // The staged copy is left behind
    assert!(staging.path().join("cierre.xlsx").exists());
}

#[tokio::test]
async fn test_delimited_upload_writes_header_without_index() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "x2"})))
        .mount(&server)
        .await;

    let staging = tempdir().unwrap();
    let drive = drive_client(&server, staging.path());
    drive
        .upload_delimited(&balances(), "saldos.csv", FOLDER_ID)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let (metadata, media) = related_parts(&requests[0]);
    assert_eq!(metadata["name"], "saldos.csv");
    assert_eq!(
        String::from_utf8(media).unwrap(),
        "identificacion,saldo,activo\n10,1500,true\n11,20.5,\n"
    );
    assert!(String::from_utf8_lossy(&requests[0].body).contains("Content-Type: text/csv"));
}

// ===== Validation =====

#[tokio::test]
async fn test_empty_book_is_rejected_before_any_call() {
    let server = MockServer::start().await;
    let staging = tempdir().unwrap();
    let drive = drive_client(&server, staging.path());

    let err = drive
        .upload_workbook(&Book::new(), FOLDER_ID, "vacio.xlsx")
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::InvalidArgument(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(!staging.path().join("vacio.xlsx").exists());
}

#[tokio::test]
async fn test_workbook_validation_order() {
    let server = MockServer::start().await;
    let staging = tempdir().unwrap();
    let drive = drive_client(&server, staging.path());
    let book = Book::from_sheets([("Saldos", balances())]).unwrap();

    // tables are checked first
    let err = drive
        .upload_workbook(&Book::new(), "bad", "bad.csv")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("tables"));

    // then the folder
    let err = drive
        .upload_workbook(&book, "bad", "bad.csv")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("folder"));

    // then the name
    let err = drive
        .upload_workbook(&book, FOLDER_ID, "bad.csv")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("workbook name"));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delimited_upload_checks_folder() {
    let server = MockServer::start().await;
    let staging = tempdir().unwrap();
    let drive = drive_client(&server, staging.path());

    let err = drive
        .upload_delimited(&balances(), "saldos.csv", "not-a-folder")
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::InvalidArgument(_)));
}

// ===== Downloads =====

#[tokio::test]
async fn test_delimited_upload_rejects_paths_outside_staging() {
    let server = MockServer::start().await;
    mount_echo_drive(&server).await;
    let staging = tempdir().unwrap();
    let elsewhere = tempdir().unwrap();
    let victim = elsewhere.path().join("victim.txt");
    std::fs::write(&victim, "precious").unwrap();
    let drive = drive_client(&server, staging.path());
    let sheet = Sheet::from_rows(vec!["a"], vec![vec![CellValue::Int(1)]]).unwrap();

    let absolute = victim.to_str().unwrap().to_string();
    for name in [absolute.as_str(), "../x.csv"] {
        let err = drive
            .upload_delimited(&sheet, name, FOLDER_ID)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)), "{name}");
    }

    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(std::fs::read_to_string(&victim).unwrap(), "precious");
    assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_workbook_is_remote_read() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {"code": 404, "message": "File not found: nope."}
        })))
        .mount(&server)
        .await;

    let staging = tempdir().unwrap();
    let drive = drive_client(&server, staging.path());
    let err = drive.download_workbook("nope", None).await.unwrap_err();
    assert!(matches!(err, BridgeError::RemoteRead { ref id } if id == "nope"));
}

#[tokio::test]
async fn test_unparseable_workbook_is_sheet_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files/notes"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_string("just some text"))
        .mount(&server)
        .await;

    let staging = tempdir().unwrap();
    let drive = drive_client(&server, staging.path());
    let err = drive.download_workbook("notes", None).await.unwrap_err();
    assert!(matches!(err, BridgeError::Sheet(_)));
}

#[tokio::test]
async fn test_missing_delimited_is_remote_read() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let staging = tempdir().unwrap();
    let drive = drive_client(&server, staging.path());
    let err = drive
        .download_delimited("locked", CsvOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::RemoteRead { ref id } if id == "locked"));
}

#[tokio::test]
async fn test_delimited_latin1_with_options() {
    let server = MockServer::start().await;
    // "titulo\nregión;año\nCaribe;2023\n" in windows-1252, semicolon separated
    let body = b"titulo\nregi\xF3n;a\xF1o\nCaribe;2023\n".to_vec();
    Mock::given(method("GET"))
        .and(path("/drive/v3/files/legacy"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;

    let staging = tempdir().unwrap();
    let drive = drive_client(&server, staging.path());
    let options = CsvOptions::default()
        .with_delimiter(b';')
        .with_header_row(Some(1));
    let sheet = drive.download_delimited("legacy", options).await.unwrap();

    assert_eq!(sheet.columns(), &["región", "año"]);
    assert_eq!(
        sheet.row(0).unwrap(),
        &[CellValue::from("Caribe"), CellValue::from("2023")]
    );
}

// ===== Listing and metadata =====

#[tokio::test]
async fn test_list_files_follows_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [{"id": "a", "name": "a.csv", "mimeType": "text/csv"}],
            "nextPageToken": "p2"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("pageToken", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [{"id": "b", "name": "b.xlsx", "mimeType": XLSX_MIME_TYPE}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let staging = tempdir().unwrap();
    let drive = drive_client(&server, staging.path());
    let files = drive.list_files(FOLDER_ID).await.unwrap();

    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.csv", "b.xlsx"]);
    assert_eq!(files[1].mime_type, XLSX_MIME_TYPE);

    let requests = server.received_requests().await.unwrap();
    let query: Vec<(String, String)> = requests[0]
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert!(query.contains(&(
        "q".to_string(),
        format!("'{FOLDER_ID}' in parents and trashed = false")
    )));
}

#[tokio::test]
async fn test_create_file_sends_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "new"})))
        .expect(1)
        .mount(&server)
        .await;

    let staging = tempdir().unwrap();
    let drive = drive_client(&server, staging.path());
    let id = drive
        .create_file(FOLDER_ID, "Tablero", "application/vnd.google-apps.spreadsheet")
        .await
        .unwrap();
    assert_eq!(id, "new");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "name": "Tablero",
            "mimeType": "application/vnd.google-apps.spreadsheet",
            "parents": [FOLDER_ID]
        })
    );
}
