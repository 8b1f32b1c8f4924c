//! Error types for the token crate.

use chrono::{DateTime, Utc};
use pkauth_core::StoreError;
use thiserror::Error;

/// Errors that can occur while signing or checking a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Not three base64url segments, undecodable claims, or an unexpected algorithm.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// Signature does not match the derived secret (tampered, or the key was rotated).
    #[error("invalid signature")]
    InvalidSignature,

    /// Signature is valid but the embedded expiry has passed.
    #[error("token has expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },

    /// Failed to create a token.
    #[error("failed to sign token: {0}")]
    SigningFailed(String),
}

impl TokenError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Malformed(_) => "malformed",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Expired { .. } => "expired",
            TokenError::SigningFailed(_) => "signing_failed",
        }
    }
}

/// Errors from [`revoke`](crate::revoke).
#[derive(Debug, Error)]
pub enum RevocationError {
    #[error("principal not found: {0}")]
    PrincipalNotFound(String),

    /// The rotated key was not durably saved; the revocation did not happen.
    #[error("failed to persist rotated personal key: {0}")]
    Persistence(#[source] StoreError),
}
