//! HTTP routes over a [`DocumentRegistry`].

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use docuchain::{DocumentRegistry, Fingerprint, HealthReport, IssueRequest};
use docuchain_store::Store;

use crate::api::{ChainResponse, DocumentsResponse, IssueResponse, VerifyResponse};
use crate::archive::{self, DocumentArchive};
use crate::errors::ApiError;

/// Room for multipart framing and metadata fields on top of the document.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared handler state.
pub struct AppState<S: Store> {
    pub registry: DocumentRegistry<S>,
    pub archive: Arc<DocumentArchive>,
}

impl<S: Store> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            archive: Arc::clone(&self.archive),
        }
    }
}

impl<S: Store> AppState<S> {
    pub fn new(registry: DocumentRegistry<S>, archive: DocumentArchive) -> Self {
        Self {
            registry,
            archive: Arc::new(archive),
        }
    }
}

pub fn build_router<S: Store + 'static>(state: AppState<S>) -> Router {
    let body_limit = state.registry.ledger().config().max_file_size + MULTIPART_OVERHEAD;
    Router::new()
        .route("/api/health", get(health::<S>))
        .route("/api/issue", post(issue::<S>))
        .route("/api/verify", post(verify::<S>))
        .route("/api/documents", get(all_documents::<S>))
        .route("/api/documents/:recipient_id", get(documents_for::<S>))
        .route("/api/blockchain", get(blockchain::<S>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn health<S: Store + 'static>(State(state): State<AppState<S>>) -> Json<HealthReport> {
    Json(state.registry.health_check())
}

async fn issue<S: Store + 'static>(
    State(state): State<AppState<S>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<IssueResponse>), ApiError> {
    let mut upload = Upload::read(multipart).await?;
    let (file_name, content) = upload.file()?;
    let extension = archive::allowed_extension(&file_name).ok_or_else(|| {
        ApiError::bad_request(format!(
            "invalid file type; allowed: {}",
            archive::allowed_list()
        ))
    })?;

    let request = IssueRequest {
        issuer_org: upload.required("issuer_org")?,
        doc_type: upload.required("doc_type")?,
        doc_title: upload.required("doc_title")?,
        recipient_name: upload.required("recipient_name")?,
        recipient_id: upload.required("recipient_id")?,
        file_name: Some(file_name),
        content,
    };
    let content = request.content.clone();
    let issued = state.registry.issue(request).await?;

    // The block is already durable; archiving is best effort.
    if let Err(e) = state
        .archive
        .store(&issued.record.fingerprint, extension, &content)
        .await
    {
        tracing::error!(
            fingerprint = %issued.record.fingerprint,
            error = %e,
            "failed to archive issued document"
        );
    }

    Ok((StatusCode::CREATED, Json(issued.into())))
}

/// Verify an uploaded `file`, or a hex `document_hash` field.
async fn verify<S: Store + 'static>(
    State(state): State<AppState<S>>,
    multipart: Multipart,
) -> Result<Json<VerifyResponse>, ApiError> {
    let mut upload = Upload::read(multipart).await?;
    let fingerprint = if upload.file.is_some() {
        let (_, content) = upload.file()?;
        Fingerprint::of(&content)
    } else {
        let hex = upload.required("document_hash")?;
        hex.parse::<Fingerprint>()
            .map_err(|e| ApiError::bad_request(format!("invalid document_hash: {}", e)))?
    };
    let outcome = state.registry.verify_fingerprint(&fingerprint);
    Ok(Json(VerifyResponse::new(fingerprint, outcome)))
}

async fn all_documents<S: Store + 'static>(
    State(state): State<AppState<S>>,
) -> Json<DocumentsResponse> {
    Json(state.registry.all_documents().into())
}

async fn documents_for<S: Store + 'static>(
    State(state): State<AppState<S>>,
    Path(recipient_id): Path<String>,
) -> Json<DocumentsResponse> {
    Json(state.registry.documents_for(&recipient_id).into())
}

async fn blockchain<S: Store + 'static>(State(state): State<AppState<S>>) -> Json<ChainResponse> {
    Json(state.registry.export_chain().into())
}

// ─────────────────────────────────────────────────────────────────────────────
// Multipart
// ─────────────────────────────────────────────────────────────────────────────

/// A parsed multipart form: at most one `file` part plus text fields.
#[derive(Debug, Default)]
struct Upload {
    file: Option<(String, Bytes)>,
    fields: HashMap<String, String>,
}

impl Upload {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut upload = Upload::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content = field.bytes().await?;
                upload.file = Some((file_name, content));
            } else {
                let value = field.text().await?;
                upload.fields.insert(name, value);
            }
        }
        Ok(upload)
    }

    fn file(&mut self) -> Result<(String, Bytes), ApiError> {
        let (raw_name, content) = self
            .file
            .take()
            .ok_or_else(|| ApiError::bad_request("no file provided"))?;
        let file_name = archive::sanitize_file_name(&raw_name)
            .ok_or_else(|| ApiError::bad_request("no file selected"))?;
        Ok((file_name, content))
    }

    fn required(&mut self, name: &str) -> Result<String, ApiError> {
        self.fields
            .remove(name)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request(format!("missing required field `{}`", name)))
    }
}
