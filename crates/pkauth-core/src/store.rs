//! Credential store contract.
//!
//! The token layer only needs lookups and a way to persist a rotated personal
//! key; everything else about user records belongs to the implementation.

use crate::error::StoreError;
use crate::principal::Principal;
use async_trait::async_trait;

/// Persistence for principals.
///
/// Implementations must provide read-after-write consistency for
/// `personal_key`: a lookup that starts after `save` returns must observe the
/// saved key.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Principal>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, StoreError>;

    /// Whether any principal already uses this username or (normalized) email.
    async fn exists_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, StoreError>;

    /// Create a new principal. Fails with [`StoreError::Conflict`] on a taken
    /// username or email.
    async fn insert(&self, principal: &Principal) -> Result<(), StoreError>;

    /// Persist mutations of an existing principal, including key rotation.
    async fn save(&self, principal: &Principal) -> Result<(), StoreError>;
}
