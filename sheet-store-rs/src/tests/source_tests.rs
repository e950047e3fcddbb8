use std::sync::Arc;

use relay_sdk::config::SheetsConfig;
use relay_sdk::sheets::SheetsClient;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::cache::SheetKey;
use crate::errors::StoreError;
use crate::source::{JsonFileSource, SheetsApiSource, TableSource};

#[tokio::test]
async fn test_json_file_source_reads_values_document() {
    let dir = tempfile::tempdir().unwrap();
    let key = SheetKey::new("sheet-1", "Owner Review");
    let source = JsonFileSource::new(dir.path());

    let path = source.path_for(&key);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let document = json!({
        "range": "'Owner Review'!A1:C3",
        "majorDimension": "ROWS",
        "values": [
            ["id", "state", "amount"],
            ["REQ-100", "approved", 42],
            ["REQ-200"]
        ]
    });
    std::fs::write(&path, document.to_string()).unwrap();

    let table = source.load(&key).await.unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.cell(0, 2), "42");
    assert_eq!(table.cell(1, 1), "");
}

#[tokio::test]
async fn test_json_file_source_missing_and_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let key = SheetKey::new("sheet-1", "Requests");
    let source = JsonFileSource::new(dir.path());

    let err = source.load(&key).await.unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));

    let path = source.path_for(&key);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ not json").unwrap();

    let err = source.load(&key).await.unwrap_err();
    assert!(matches!(err, StoreError::Malformed(_)));
    assert!(!err.is_configuration());
}

#[tokio::test]
async fn test_sheets_api_source_loads_table() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-1/values/Requests"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Requests!A1:D2",
            "majorDimension": "ROWS",
            "values": [
                ["Request_ID", "STATE", "Authorize"],
                ["REQ-100", "approved", "https://hooks.example.com/a"]
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SheetsClient::new(SheetsConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        timeout_seconds: 5,
    })
    .unwrap();
    let source = SheetsApiSource::new(Arc::new(client));

    let table = source
        .load(&SheetKey::new("sheet-1", "Requests"))
        .await
        .unwrap();

    assert_eq!(table.resolve_column("state"), Some("STATE"));
    assert_eq!(table.cell(0, 0), "REQ-100");
}

#[tokio::test]
async fn test_sheets_api_source_surfaces_unavailability() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
        .mount(&server)
        .await;

    let client = SheetsClient::new(SheetsConfig {
        base_url: server.uri(),
        api_key: None,
        timeout_seconds: 5,
    })
    .unwrap();
    let source = SheetsApiSource::new(Arc::new(client));

    let err = source
        .load(&SheetKey::new("sheet-1", "Requests"))
        .await
        .unwrap_err();

    match err {
        StoreError::Source(inner) => assert_eq!(inner.status_code(), Some(500)),
        other => panic!("unexpected error: {other:?}"),
    }
}
