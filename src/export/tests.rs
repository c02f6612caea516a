//! Tests for export staging
//!
//! The load-bearing property: the staging file must not exist after the
//! export path exits, no matter how it exits.

use super::*;
use crate::http::{HttpClient, HttpClientConfig};
use tokio::io::AsyncBufReadExt;
use wiremock::matchers::{method, path as url_path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base: &str) -> HttpClient {
    HttpClient::with_config(
        HttpClientConfig::builder()
            .base_url(base)
            .max_retries(0)
            .no_rate_limit()
            .build(),
    )
}

fn staging_is_empty(root: &Path) -> bool {
    std::fs::read_dir(root).unwrap().next().is_none()
}

// ============================================================================
// ExportBuffer scoping
// ============================================================================

#[tokio::test]
async fn test_buffer_removed_on_drop() {
    let root = tempfile::tempdir().unwrap();

    let staged_path;
    {
        let buffer = ExportBuffer::create(Some(root.path())).unwrap();
        tokio::fs::write(buffer.path(), b"{\"messageId\": \"a\"}\n")
            .await
            .unwrap();
        staged_path = buffer.path().to_path_buf();
        assert!(staged_path.exists());
    }

    assert!(!staged_path.exists());
    assert!(staging_is_empty(root.path()));
}

#[tokio::test]
async fn test_buffer_removed_when_owner_errors_mid_copy() {
    let root = tempfile::tempdir().unwrap();

    // Simulates a fetch that fails after a partial write: the owning scope
    // returns an error and the guard must still clean up.
    async fn partial_copy(root: &Path) -> Result<ExportBuffer> {
        let buffer = ExportBuffer::create(Some(root))?;
        tokio::fs::write(buffer.path(), b"{\"messageId\":").await?;
        Err(Error::decode("connection interrupted"))
    }

    let err = partial_copy(root.path()).await.unwrap_err();
    assert!(err.to_string().contains("interrupted"));
    assert!(staging_is_empty(root.path()));
}

#[tokio::test]
async fn test_buffer_reader_round_trip() {
    let buffer = ExportBuffer::create(None).unwrap();
    tokio::fs::write(buffer.path(), b"line one\nline two\n")
        .await
        .unwrap();

    let mut lines = buffer.reader().await.unwrap().lines();
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("line one"));
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("line two"));
    assert_eq!(lines.next_line().await.unwrap(), None);
}

// ============================================================================
// download()
// ============================================================================

#[tokio::test]
async fn test_download_stages_body() {
    let mock_server = MockServer::start().await;
    let body = "{\"messageId\": \"a\"}\n{\"messageId\": \"b\"}\n";

    Mock::given(method("GET"))
        .and(url_path("/export/data.json"))
        .and(query_param("dataTypeName", "emailSend"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let root = tempfile::tempdir().unwrap();

    let request = RequestConfig::new().query("dataTypeName", "emailSend");
    let buffer = download(&client, "/export/data.json", request, Some(root.path()))
        .await
        .unwrap();

    let staged = tokio::fs::read_to_string(buffer.path()).await.unwrap();
    assert_eq!(staged, body);

    drop(buffer);
    assert!(staging_is_empty(root.path()));
}

#[tokio::test]
async fn test_download_http_error_leaves_no_staging() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(url_path("/export/data.json"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad dataTypeName"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let root = tempfile::tempdir().unwrap();

    let err = download(
        &client,
        "/export/data.json",
        RequestConfig::new(),
        Some(root.path()),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 400, .. }));
    assert!(staging_is_empty(root.path()));
}

#[tokio::test]
async fn test_download_empty_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(url_path("/export/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let buffer = download(&client, "/export/data.json", RequestConfig::new(), None)
        .await
        .unwrap();

    let staged = tokio::fs::read_to_string(buffer.path()).await.unwrap();
    assert!(staged.is_empty());
}
