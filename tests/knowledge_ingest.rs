mod support;

use chatrelay::orchestration::{ingest_document, ingest_path, KnowledgeError};
use chatrelay::shared::{EventLog, KnowledgeId};
use chatrelay::webui::WebUiClient;
use std::time::Duration;
use support::{ok, MockHttpServer};

fn client_for(base_url: &str) -> WebUiClient {
    WebUiClient::new(base_url, "sk-test", Duration::from_secs(5), EventLog::discard())
}

fn kb() -> KnowledgeId {
    KnowledgeId::parse("kb1").expect("kb")
}

#[test]
fn upload_failure_is_annotated() {
    let server = MockHttpServer::start(1, |_| (413, r#"{"detail":"too large"}"#.to_string()));
    let err = ingest_document(
        &client_for(&server.base_url),
        &kb(),
        "big.pdf",
        Some("application/pdf"),
        b"%PDF",
    )
    .expect_err("upload fails");
    let requests = server.finish();

    assert!(requests[0]
        .content_type
        .starts_with("multipart/form-data; boundary="));
    assert!(requests[0].body.contains("filename=\"big.pdf\""));
    assert!(requests[0].body.contains("Content-Type: application/pdf"));
    assert_eq!(requests[0].auth_header, "Bearer sk-test");

    assert!(matches!(err, KnowledgeError::Upload(_)));
    assert!(err.to_string().starts_with("failed to upload file"));
}

#[test]
fn upload_without_id_stops_before_collection_add() {
    let server = MockHttpServer::start(1, |_| ok(r#"{"id":""}"#));
    let err = ingest_document(&client_for(&server.base_url), &kb(), "a.md", None, b"a")
        .expect_err("no id");
    let requests = server.finish();

    assert_eq!(requests.len(), 1);
    assert!(matches!(err, KnowledgeError::InvalidFileId(_)));
}

#[test]
fn collection_add_failure_names_both_ids() {
    let server = MockHttpServer::start(2, |request| {
        if request.path == "/api/v1/files/" {
            ok(r#"{"id":"file-1"}"#)
        } else {
            (404, r#"{"detail":"knowledge not found"}"#.to_string())
        }
    });
    let err = ingest_document(&client_for(&server.base_url), &kb(), "a.md", None, b"a")
        .expect_err("add fails");
    server.finish();

    let message = err.to_string();
    assert!(message.contains("file-1"));
    assert!(message.contains("kb1"));
}

#[test]
fn missing_local_file_is_a_read_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let err = ingest_path(
        &client_for("http://127.0.0.1:9"),
        &kb(),
        &temp.path().join("absent.md"),
    )
    .expect_err("missing");
    assert!(matches!(err, KnowledgeError::Read { .. }));
}
