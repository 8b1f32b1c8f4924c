//! Error types for the core crate.

use thiserror::Error;

/// Errors surfaced by a [`CredentialStore`](crate::CredentialStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The principal to update no longer exists.
    #[error("principal not found: {0}")]
    NotFound(String),

    /// Username or email already taken.
    #[error("principal already exists: {0}")]
    Conflict(String),

    /// Backend failure (connection, query, serialization).
    #[error("persistence error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Errors raised while validating auth configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The server signing secret is missing or blank.
    #[error("auth secret is not configured")]
    MissingSecret,

    /// The token lifetime could not be parsed.
    #[error("invalid token ttl {value:?}: {reason}")]
    InvalidTtl { value: String, reason: String },
}
