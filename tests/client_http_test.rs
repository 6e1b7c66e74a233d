use filebox_rs::client::{
    ClientError, Confirmation, Downloader, FileApi, FilesController, FilestackUploader, GraphqlClient, Notifier,
    UploadWidget, DOWNLOAD_ERROR, DOWNLOAD_LOADING, DOWNLOAD_SUCCESS,
};
use filebox_rs::config::{ReconcileMode, UploadConfig};
use filebox_rs::models::File;
use httpmock::prelude::*;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn loading(&self, message: &str) {
        self.events.lock().unwrap().push(format!("loading: {}", message));
    }

    fn success(&self, message: &str) {
        self.events.lock().unwrap().push(format!("success: {}", message));
    }

    fn error(&self, message: &str) {
        self.events.lock().unwrap().push(format!("error: {}", message));
    }

    fn dismiss_all(&self) {}
}

struct AlwaysYes;

#[async_trait::async_trait]
impl Confirmation for AlwaysYes {
    async fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

fn file_json(id: &str, name: &str, version: i32) -> serde_json::Value {
    json!({ "id": id, "name": name, "url": "https://cdn.filestackcontent.com/x", "type": "image/png", "version": version })
}

#[tokio::test]
async fn test_graphql_client_sends_bearer_token_and_decodes_list() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/graphql").header("authorization", "Bearer t0k3n");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "data": { "files": [file_json("f1", "a.png", 2)] } }));
        })
        .await;

    let client = GraphqlClient::new(&server.base_url(), Some("t0k3n".to_string()));
    let files = client.files().await.unwrap();

    mock.assert_async().await;
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_type, "image/png");
    assert_eq!(files[0].version, 2);
}

#[tokio::test]
async fn test_graphql_client_maps_error_codes() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/graphql");
            then.status(200).header("content-type", "application/json").json_body(json!({
                "data": null,
                "errors": [{
                    "message": "You don't have permission to do that.",
                    "extensions": { "code": "UNAUTHENTICATED" }
                }]
            }));
        })
        .await;

    let client = GraphqlClient::new(&server.base_url(), None);
    let err = client.search_files("a.png").await.unwrap_err();

    assert!(err.is_unauthenticated());
    assert_eq!(err.to_string(), "You don't have permission to do that.");
}

#[tokio::test]
async fn test_graphql_client_null_file_is_none() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/graphql");
            then.status(200).header("content-type", "application/json").json_body(json!({ "data": { "file": null } }));
        })
        .await;

    let client = GraphqlClient::new(&server.base_url(), Some("t".to_string()));
    assert_eq!(client.file("missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_graphql_client_reports_http_failures() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/graphql");
            then.status(503).body("maintenance");
        })
        .await;

    let client = GraphqlClient::new(&server.base_url(), Some("t".to_string()));
    match client.files().await {
        Err(ClientError::Http { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected an HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_downloader_saves_blob_under_record_name() {
    let server = MockServer::start_async().await;
    let payload: Vec<u8> = vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3];
    let body = payload.clone();
    server
        .mock_async(move |when, then| {
            when.method(GET).path("/blob/abc");
            then.status(200).header("content-type", "application/octet-stream").body(body.clone());
        })
        .await;

    let dir = TempDir::new().unwrap();
    let downloader = Downloader::new(dir.path());
    let path = downloader.download(&server.url("/blob/abc"), "../pic.png").await.unwrap();

    assert_eq!(path, dir.path().join("pic.png"));
    assert_eq!(std::fs::read(&path).unwrap(), payload);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_controller_download_notifies_outcome() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/ok");
            then.status(200).body("hello");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/gone");
            then.status(404).body("not here");
        })
        .await;

    let dir = TempDir::new().unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = FilesController::new(
        Arc::new(GraphqlClient::new(&server.base_url(), None)),
        notifier.clone(),
        Arc::new(AlwaysYes),
        Downloader::new(dir.path()),
        ReconcileMode::Search,
    );

    let record = |url: String| File {
        id: "f1".to_string(),
        name: "notes.txt".to_string(),
        url,
        file_type: "text/plain".to_string(),
        version: 1,
    };

    let saved = controller.download(&record(server.url("/ok"))).await.unwrap();
    assert_eq!(std::fs::read_to_string(saved).unwrap(), "hello");

    assert!(controller.download(&record(server.url("/gone"))).await.is_err());

    assert_eq!(
        *notifier.events.lock().unwrap(),
        vec![
            format!("loading: {}", DOWNLOAD_LOADING),
            format!("success: {}", DOWNLOAD_SUCCESS),
            format!("loading: {}", DOWNLOAD_LOADING),
            format!("error: {}", DOWNLOAD_ERROR),
        ]
    );
}

fn upload_config(store_url: String, max_size_bytes: u64) -> UploadConfig {
    UploadConfig { filestack_api_key: "test-key".to_string(), store_url, max_size_bytes }
}

#[tokio::test]
async fn test_filestack_uploader_stores_file() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/store/S3")
                .query_param("key", "test-key")
                .query_param("filename", "report.pdf");
            then.status(200).header("content-type", "application/json").json_body(json!({
                "url": "https://cdn.filestackcontent.com/HaNdLe",
                "size": 11,
                "type": "application/pdf",
                "filename": "report.pdf"
            }));
        })
        .await;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.pdf");
    std::fs::write(&path, b"%PDF-1.4 hi").unwrap();

    let uploader = FilestackUploader::new(&upload_config(server.url("/api/store/S3"), 1024));
    let uploaded = uploader.upload(&path).await.expect("upload completes");

    mock.assert_async().await;
    assert_eq!(uploaded.filename, "report.pdf");
    assert_eq!(uploaded.handle, "HaNdLe");
    assert_eq!(uploaded.mimetype, "application/pdf");
    assert_eq!(uploaded.size, 11);
    assert_eq!(uploaded.url, "https://cdn.filestackcontent.com/HaNdLe");
}

#[tokio::test]
async fn test_filestack_uploader_rejects_oversized_files() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/store/S3");
            then.status(200).json_body(json!({ "url": "https://cdn.filestackcontent.com/x" }));
        })
        .await;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("big.bin");
    std::fs::write(&path, vec![0u8; 64]).unwrap();

    let uploader = FilestackUploader::new(&upload_config(server.url("/api/store/S3"), 16));
    match uploader.store(&path).await {
        Err(ClientError::TooLarge { name, size, limit }) => {
            assert_eq!(name, "big.bin");
            assert_eq!(size, 64);
            assert_eq!(limit, 16);
        }
        other => panic!("expected TooLarge, got {:?}", other),
    }
    assert!(uploader.upload(&path).await.is_none());
    assert_eq!(mock.hits(), 0);
}
