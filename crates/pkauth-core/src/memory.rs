//! In-memory credential store.
//!
//! Suitable for tests and embedding. Data is lost when the process exits.
//! Locks are only held inside each call, never across an `.await`.

use crate::error::StoreError;
use crate::principal::{Principal, normalize_email};
use crate::store::CredentialStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    principals: RwLock<HashMap<String, Principal>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.principals.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("credential store lock poisoned".to_string())
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Principal>, StoreError> {
        let map = self.principals.read().map_err(poisoned)?;
        Ok(map.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, StoreError> {
        let map = self.principals.read().map_err(poisoned)?;
        Ok(map.values().find(|p| p.username == username).cloned())
    }

    async fn exists_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, StoreError> {
        let email = normalize_email(email);
        let map = self.principals.read().map_err(poisoned)?;
        Ok(map
            .values()
            .any(|p| p.username == username || p.email == email))
    }

    async fn insert(&self, principal: &Principal) -> Result<(), StoreError> {
        let mut map = self.principals.write().map_err(poisoned)?;
        let taken = map.contains_key(&principal.id)
            || map
                .values()
                .any(|p| p.username == principal.username || p.email == principal.email);
        if taken {
            return Err(StoreError::Conflict(principal.username.clone()));
        }
        map.insert(principal.id.clone(), principal.clone());
        Ok(())
    }

    async fn save(&self, principal: &Principal) -> Result<(), StoreError> {
        let mut map = self.principals.write().map_err(poisoned)?;
        match map.get_mut(&principal.id) {
            Some(existing) => {
                *existing = principal.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(principal.id.clone())),
        }
    }
}
