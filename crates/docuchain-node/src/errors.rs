//! HTTP error mapping.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docuchain::{ErrorClass, LedgerError};
use serde_json::json;
use thiserror::Error;

/// Errors returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("{0}")]
    BadRequest(String),

    #[error("malformed upload: {0}")]
    Multipart(#[from] MultipartError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Ledger(e) => match e.class() {
                ErrorClass::Input => StatusCode::BAD_REQUEST,
                ErrorClass::Integrity => StatusCode::CONFLICT,
                ErrorClass::Resource => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Multipart(e) => e.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docuchain::Fingerprint;
    use docuchain_core::MiningError;

    #[test]
    fn test_status_follows_error_class() {
        let input = ApiError::from(LedgerError::InvalidInput("document is empty".into()));
        assert_eq!(input.status(), StatusCode::BAD_REQUEST);

        let duplicate = ApiError::from(LedgerError::DuplicateFingerprint {
            fingerprint: Fingerprint::of(b"hello"),
            block_index: Some(1),
        });
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let mining = ApiError::from(LedgerError::MiningFailed(MiningError::Cancelled {
            attempts: 3,
        }));
        assert_eq!(mining.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(
            ApiError::bad_request("no file provided").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_message_is_not_wrapped() {
        let e = ApiError::from(LedgerError::EmptyBatch);
        assert_eq!(e.to_string(), "cannot append an empty batch");
    }
}
