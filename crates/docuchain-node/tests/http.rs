//! HTTP API tests driven through the router with `tower::ServiceExt::oneshot`.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use docuchain::{BlockHash, DocumentRegistry, Fingerprint};
use docuchain_node::archive::DocumentArchive;
use docuchain_node::{build_router, AppState};
use docuchain_store::{MemoryStore, Store};
use docuchain_testkit::{mined_chain, TestFixture};
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "docuchain-test-boundary";

fn router<S: Store + 'static>(registry: DocumentRegistry<S>, documents: &Path) -> Router {
    build_router(AppState::new(registry, DocumentArchive::new(documents)))
}

/// Hand-built multipart/form-data body.
struct Form {
    body: Vec<u8>,
}

impl Form {
    fn new() -> Self {
        Self { body: Vec::new() }
    }

    fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    fn file(mut self, file_name: &str, content: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(content);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn metadata(self, recipient_id: &str) -> Self {
        self.text("issuer_org", "State University")
            .text("doc_type", "Diploma")
            .text("doc_title", "BSc Computer Science")
            .text("recipient_name", "Ada Lovelace")
            .text("recipient_id", recipient_id)
    }

    fn into_request(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn test_health_on_fresh_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = TestFixture::new().await;
    let app = router(fixture.registry.clone(), dir.path());

    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["chain_length"], 1);
    assert_eq!(body["is_valid"], true);
}

#[tokio::test]
async fn test_issue_then_verify() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = TestFixture::new().await;
    let app = router(fixture.registry.clone(), dir.path());
    let fingerprint = Fingerprint::of(b"hello");

    let request = Form::new()
        .metadata("R1")
        .file("diploma.PDF", b"hello")
        .into_request("/api/issue");
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["block_number"], 1);
    assert_eq!(body["document_hash"], fingerprint.to_hex());
    assert_eq!(body["record"]["file_name"], "diploma.PDF");

    // Archived under its fingerprint with a normalized extension.
    let archived = dir.path().join(format!("{}.pdf", fingerprint));
    assert_eq!(std::fs::read(archived).unwrap(), b"hello");

    let request = Form::new().file("copy.pdf", b"hello").into_request("/api/verify");
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["result"], "valid");
    assert_eq!(body["block_index"], 1);
    assert_eq!(body["record"]["recipient_id"], "R1");

    let request = Form::new().file("other.pdf", b"forged").into_request("/api/verify");
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["result"], "not_found");
}

#[tokio::test]
async fn test_verify_requires_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = TestFixture::new().await;
    let app = router(fixture.registry.clone(), dir.path());

    let request = Form::new().file("", b"hello").into_request("/api/verify");
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no file selected");
}

#[tokio::test]
async fn test_verify_by_document_hash() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = TestFixture::new().await;
    let app = router(fixture.registry.clone(), dir.path());

    let request = Form::new()
        .metadata("R1")
        .file("scan.png", b"png bytes")
        .into_request("/api/issue");
    assert_eq!(send(&app, request).await.0, StatusCode::CREATED);

    let hex = Fingerprint::of(b"png bytes").to_hex();
    let request = Form::new()
        .text("document_hash", &hex)
        .into_request("/api/verify");
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);

    let request = Form::new()
        .text("document_hash", "not-hex")
        .into_request("/api/verify");
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("document_hash"));
}

#[tokio::test]
async fn test_duplicate_issue_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = TestFixture::new().await;
    let app = router(fixture.registry.clone(), dir.path());

    let first = Form::new()
        .metadata("R1")
        .file("a.pdf", b"same bytes")
        .into_request("/api/issue");
    assert_eq!(send(&app, first).await.0, StatusCode::CREATED);

    let second = Form::new()
        .metadata("R2")
        .file("b.pdf", b"same bytes")
        .into_request("/api/issue");
    let (status, body) = send(&app, second).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already issued"));
    assert_eq!(fixture.ledger.len(), 2);
}

#[tokio::test]
async fn test_issue_rejects_bad_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = TestFixture::new().await;
    let app = router(fixture.registry.clone(), dir.path());

    let no_file = Form::new().metadata("R1").into_request("/api/issue");
    let (status, body) = send(&app, no_file).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no file provided");

    let wrong_type = Form::new()
        .metadata("R1")
        .file("notes.txt", b"text")
        .into_request("/api/issue");
    let (status, body) = send(&app, wrong_type).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains(".pdf"));

    let missing_field = Form::new()
        .text("issuer_org", "State University")
        .file("a.pdf", b"content")
        .into_request("/api/issue");
    let (status, body) = send(&app, missing_field).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("doc_type"));

    let empty = Form::new()
        .metadata("R1")
        .file("a.pdf", b"")
        .into_request("/api/issue");
    assert_eq!(send(&app, empty).await.0, StatusCode::BAD_REQUEST);

    // Nothing was sealed.
    assert_eq!(fixture.ledger.len(), 1);
}

#[tokio::test]
async fn test_documents_and_blockchain() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = TestFixture::new().await;
    let app = router(fixture.registry.clone(), dir.path());

    for (content, recipient) in [
        (b"one".as_slice(), "R1"),
        (b"two".as_slice(), "R2"),
        (b"three".as_slice(), "R1"),
    ] {
        let request = Form::new()
            .metadata(recipient)
            .file("doc.pdf", content)
            .into_request("/api/issue");
        assert_eq!(send(&app, request).await.0, StatusCode::CREATED);
    }

    let (status, body) = get(&app, "/api/documents/R1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["documents"][0]["block_index"], 1);
    assert_eq!(body["documents"][1]["block_index"], 3);

    let (_, body) = get(&app, "/api/documents/nobody").await;
    assert_eq!(body["count"], 0);

    let (_, body) = get(&app, "/api/documents").await;
    assert_eq!(body["count"], 3);

    let (status, body) = get(&app, "/api/blockchain").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["length"], 4);
    assert_eq!(body["is_valid"], true);
    assert_eq!(body["chain"].as_array().unwrap().len(), 4);
    assert_eq!(body["chain"][0]["previous_hash"], BlockHash::ZERO.to_hex());
}

#[tokio::test]
async fn test_tampered_ledger_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut blocks = mined_chain(3);
    let victim = blocks[1].records[0].fingerprint;
    blocks[1].previous_hash = BlockHash::from_bytes([0x11; 32]);

    let ledger = docuchain_testkit::fixtures::open_ledger(MemoryStore::with_blocks(blocks)).await;
    let app = router(DocumentRegistry::new(Arc::new(ledger)), dir.path());

    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "tampered");
    assert_eq!(body["first_invalid"], 1);

    let request = Form::new()
        .text("document_hash", &victim.to_hex())
        .into_request("/api/verify");
    let (_, body) = send(&app, request).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["result"], "chain_tampered");
    assert_eq!(body["index"], 1);

    let (_, body) = get(&app, "/api/blockchain").await;
    assert_eq!(body["is_valid"], false);
}
