//! SQLite-backed credential store.

use crate::auth::models::PrincipalRow;
use async_trait::async_trait;
use pkauth_core::principal::normalize_email;
use pkauth_core::{CredentialStore, Principal, StoreError};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;

const SELECT_PRINCIPAL: &str = "SELECT id, username, email, name, password_hash, personal_key, \
     created_at, updated_at FROM principals";

#[derive(Debug, Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    /// Open the database file and run migrations. The file and any missing
    /// parent directories are created.
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::from_pool(pool).await
    }

    /// Single-connection in-memory database; each connection would otherwise
    /// see its own empty database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> anyhow::Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn write_error(err: sqlx::Error, principal: &Principal) -> StoreError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(principal.username.clone())
        }
        other => StoreError::backend(other),
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Principal>, StoreError> {
        let row: Option<PrincipalRow> =
            sqlx::query_as(&format!("{SELECT_PRINCIPAL} WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::backend)?;
        Ok(row.map(Principal::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, StoreError> {
        let row: Option<PrincipalRow> =
            sqlx::query_as(&format!("{SELECT_PRINCIPAL} WHERE username = ?"))
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::backend)?;
        Ok(row.map(Principal::from))
    }

    async fn exists_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, StoreError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(1) FROM principals WHERE username = ? OR email = ?")
                .bind(username)
                .bind(normalize_email(email))
                .fetch_one(&self.pool)
                .await
                .map_err(StoreError::backend)?;
        Ok(count.0 > 0)
    }

    async fn insert(&self, principal: &Principal) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO principals \
             (id, username, email, name, password_hash, personal_key, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&principal.id)
        .bind(&principal.username)
        .bind(&principal.email)
        .bind(&principal.name)
        .bind(&principal.password_hash)
        .bind(&principal.personal_key)
        .bind(principal.created_at)
        .bind(principal.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, principal))?;
        Ok(())
    }

    async fn save(&self, principal: &Principal) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE principals SET username = ?, email = ?, name = ?, password_hash = ?, \
             personal_key = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&principal.username)
        .bind(&principal.email)
        .bind(&principal.name)
        .bind(&principal.password_hash)
        .bind(&principal.personal_key)
        .bind(principal.updated_at)
        .bind(&principal.id)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, principal))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(principal.id.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(id: &str, username: &str) -> Principal {
        Principal::new(
            id,
            username,
            &format!("{username}@Example.com"),
            Some(username.to_uppercase()),
            "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA",
            format!("key-{id}"),
        )
    }

    #[tokio::test]
    async fn insert_and_find() {
        let store = SqliteCredentialStore::in_memory().await.unwrap();
        let alice = principal("u1", "alice");
        store.insert(&alice).await.unwrap();

        let by_id = store.find_by_id("u1").await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
        assert_eq!(by_id.email, "alice@example.com");
        assert_eq!(by_id.name.as_deref(), Some("ALICE"));
        assert_eq!(by_id.personal_key, "key-u1");
        assert_eq!(by_id.created_at.timestamp(), alice.created_at.timestamp());

        let by_name = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, "u1");

        assert!(store.find_by_id("nope").await.unwrap().is_none());
        assert!(store.find_by_username("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn uniqueness() {
        let store = SqliteCredentialStore::in_memory().await.unwrap();
        store.insert(&principal("u1", "alice")).await.unwrap();

        assert!(store.exists_username_or_email("alice", "x@example.com").await.unwrap());
        assert!(store.exists_username_or_email("bob", "ALICE@example.com ").await.unwrap());
        assert!(!store.exists_username_or_email("bob", "bob@example.com").await.unwrap());

        let err = store.insert(&principal("u2", "alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn save_rotated_key_is_visible_to_next_read() {
        let store = SqliteCredentialStore::in_memory().await.unwrap();
        let mut alice = principal("u1", "alice");
        store.insert(&alice).await.unwrap();

        alice.rotate_personal_key("rotated-key");
        store.save(&alice).await.unwrap();

        let loaded = store.find_by_id("u1").await.unwrap().unwrap();
        assert_eq!(loaded.personal_key, "rotated-key");
    }

    #[tokio::test]
    async fn save_missing_row_is_not_found() {
        let store = SqliteCredentialStore::in_memory().await.unwrap();
        let err = store.save(&principal("ghost", "ghost")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn open_creates_database_file_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("auth.sqlite");

        let store = SqliteCredentialStore::open(&path).await.unwrap();
        store.insert(&principal("u1", "alice")).await.unwrap();
        assert!(path.exists());
    }
}
