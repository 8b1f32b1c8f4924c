//! Principals and the identity payload carried by session tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An identity tracked by the credential store.
///
/// Deliberately not `Serialize`: use [`Principal::profile`] for anything that
/// leaves the process.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    /// Argon2 PHC string. Opaque to the token layer.
    pub password_hash: String,
    /// Per-principal fragment of the signing secret. Rotated on logout.
    pub personal_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    /// Build a fresh principal. `email` is normalized (trimmed, lowercased).
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        email: &str,
        name: Option<String>,
        password_hash: impl Into<String>,
        personal_key: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            username: username.into(),
            email: normalize_email(email),
            name,
            password_hash: password_hash.into(),
            personal_key: personal_key.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Identity snapshot to embed in a token.
    pub fn payload(&self) -> TokenPayload {
        TokenPayload {
            id: self.id.clone(),
            username: self.username.clone(),
        }
    }

    /// Public representation without credential material.
    pub fn profile(&self) -> PrincipalProfile {
        PrincipalProfile {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Replace the personal key. Every token signed under the old key stops verifying.
    pub fn rotate_personal_key(&mut self, new_key: impl Into<String>) {
        self.personal_key = new_key.into();
        self.updated_at = Utc::now();
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password_hash", &"[redacted]")
            .field("personal_key", &"[redacted]")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Externally visible form of a [`Principal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity carried in a token's signed segment. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenPayload {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
}

impl TokenPayload {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}
