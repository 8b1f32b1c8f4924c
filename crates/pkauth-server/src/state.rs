use crate::{auth::store::SqliteCredentialStore, config::AppConfig};
use pkauth_core::CredentialStore;
use pkauth_token::{SessionTokens, TokenService};
use std::{path::Path, sync::Arc};

/// Shared application state.
///
/// Holds no mutable data of its own: personal keys live in the store, and the
/// token service is immutable after construction.
pub struct AppState {
    pub cfg: AppConfig,
    pub store: Arc<dyn CredentialStore>,
    pub tokens: Arc<dyn SessionTokens>,
}

impl AppState {
    pub fn new(
        cfg: AppConfig,
        store: Arc<dyn CredentialStore>,
        tokens: Arc<dyn SessionTokens>,
    ) -> Self {
        Self { cfg, store, tokens }
    }

    /// Open the SQLite store and build the token service from `cfg.auth`.
    pub async fn init(cfg: &AppConfig) -> anyhow::Result<Self> {
        let tokens = TokenService::from_settings(&cfg.auth)?;
        let store = SqliteCredentialStore::open(Path::new(&cfg.server.database_path)).await?;

        Ok(Self::new(cfg.clone(), Arc::new(store), Arc::new(tokens)))
    }
}
