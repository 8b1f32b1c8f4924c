//! # pkauth-core
//!
//! Shared types for the pkauth authentication layer.
//!
//! - [`Principal`]: an identity tracked by the credential store, carrying the
//!   mutable *personal key* that session tokens are bound to
//! - [`TokenPayload`]: the identity snapshot embedded in every session token
//! - [`CredentialStore`]: the persistence contract the token layer relies on
//! - [`AuthSettings`]: server secret and token lifetime
//!
//! ## Revocation without a blacklist
//!
//! Tokens are signed with `server_secret ‖ personal_key`. Replacing a
//! principal's personal key makes every token issued before the change
//! unverifiable, so no list of issued tokens is ever stored.

pub mod config;
pub mod error;
pub mod memory;
pub mod principal;
pub mod store;

pub use config::{AuthSettings, ServerSecret};
pub use error::{ConfigError, StoreError};
pub use memory::MemoryCredentialStore;
pub use principal::{Principal, PrincipalProfile, TokenPayload};
pub use store::CredentialStore;
