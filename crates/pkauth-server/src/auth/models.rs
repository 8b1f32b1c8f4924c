use chrono::{DateTime, Utc};
use pkauth_core::Principal;
use serde::Deserialize;
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct PrincipalRow {
    pub id: String, // Primary Key (uuid v4)
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String, // Argon2 PHC string
    pub personal_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PrincipalRow> for Principal {
    fn from(row: PrincipalRow) -> Self {
        Principal {
            id: row.id,
            username: row.username,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            personal_key: row.personal_key,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}
