//! Revocation by personal key rotation.
//!
//! No issued token is ever recorded. Rotating the key changes the derived
//! signing secret, so every earlier token fails signature verification from
//! the next check onwards. There is no grace period.

use crate::error::RevocationError;
use crate::keys::PersonalKey;
use pkauth_core::{CredentialStore, StoreError};

/// Invalidate every token issued to `principal_id` so far.
///
/// Concurrent calls for the same principal race on `save`; whichever lands
/// last wins, and either way the old key is gone.
pub async fn revoke<S>(store: &S, principal_id: &str) -> Result<(), RevocationError>
where
    S: CredentialStore + ?Sized,
{
    let mut principal = store
        .find_by_id(principal_id)
        .await
        .map_err(RevocationError::Persistence)?
        .ok_or_else(|| RevocationError::PrincipalNotFound(principal_id.to_string()))?;

    principal.rotate_personal_key(PersonalKey::generate());

    store.save(&principal).await.map_err(|e| match e {
        StoreError::NotFound(id) => RevocationError::PrincipalNotFound(id),
        other => RevocationError::Persistence(other),
    })?;

    tracing::info!(principal_id, "personal key rotated; outstanding tokens revoked");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pkauth_core::{MemoryCredentialStore, Principal};

    /// Store whose writes always fail.
    struct ReadOnlyStore(MemoryCredentialStore);

    #[async_trait]
    impl CredentialStore for ReadOnlyStore {
        async fn find_by_id(&self, id: &str) -> Result<Option<Principal>, StoreError> {
            self.0.find_by_id(id).await
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, StoreError> {
            self.0.find_by_username(username).await
        }

        async fn exists_username_or_email(
            &self,
            username: &str,
            email: &str,
        ) -> Result<bool, StoreError> {
            self.0.exists_username_or_email(username, email).await
        }

        async fn insert(&self, principal: &Principal) -> Result<(), StoreError> {
            self.0.insert(principal).await
        }

        async fn save(&self, _principal: &Principal) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk full".to_string()))
        }
    }

    fn principal() -> Principal {
        Principal::new("u1", "alice", "alice@example.com", None, "hash", "k1")
    }

    #[tokio::test]
    async fn test_revoke_replaces_key() {
        let store = MemoryCredentialStore::new();
        store.insert(&principal()).await.unwrap();

        revoke(&store, "u1").await.unwrap();

        let reloaded = store.find_by_id("u1").await.unwrap().unwrap();
        assert_ne!(reloaded.personal_key, "k1");
        assert!(!reloaded.personal_key.is_empty());
    }

    #[tokio::test]
    async fn test_each_revocation_yields_new_key() {
        let store = MemoryCredentialStore::new();
        store.insert(&principal()).await.unwrap();

        revoke(&store, "u1").await.unwrap();
        let first = store.find_by_id("u1").await.unwrap().unwrap().personal_key;
        revoke(&store, "u1").await.unwrap();
        let second = store.find_by_id("u1").await.unwrap().unwrap().personal_key;
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_principal() {
        let store = MemoryCredentialStore::new();
        let err = revoke(&store, "ghost").await.unwrap_err();
        assert!(matches!(err, RevocationError::PrincipalNotFound(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_save_failure_is_not_success() {
        let inner = MemoryCredentialStore::new();
        inner.insert(&principal()).await.unwrap();
        let store = ReadOnlyStore(inner);

        let err = revoke(&store, "u1").await.unwrap_err();
        assert!(matches!(err, RevocationError::Persistence(StoreError::Backend(_))));

        let unchanged = store.find_by_id("u1").await.unwrap().unwrap();
        assert_eq!(unchanged.personal_key, "k1");
    }
}
