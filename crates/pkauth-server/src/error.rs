//! Error type for HTTP handlers.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pkauth_core::StoreError;
use pkauth_token::{RevocationError, TokenError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Client sent something unusable; the message is shown as-is.
    #[error("{0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    /// Credential store failure.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Logout could not durably rotate the personal key.
    #[error("revocation failed: {0}")]
    Revocation(#[source] RevocationError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<RevocationError> for ApiError {
    fn from(e: RevocationError) -> Self {
        match e {
            RevocationError::PrincipalNotFound(_) => ApiError::Forbidden,
            other => ApiError::Revocation(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::Persistence(_)
            | ApiError::Token(_)
            | ApiError::Revocation(_)
            | ApiError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
