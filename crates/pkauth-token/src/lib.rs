//! # pkauth-token
//!
//! Session token handling for pkauth.
//!
//! This crate provides functionality for:
//! - Encoding, decoding and verifying compact HS256 tokens ([`codec`])
//! - Signing tokens with a per-principal derived secret ([`TokenService`])
//! - Generating personal keys ([`PersonalKey`])
//! - Revoking every outstanding token of a principal ([`revoke`])
//!
//! ## Derived signing secret
//!
//! | Part | Scope | Changes when |
//! |------|-------|--------------|
//! | server secret | process-wide | redeploy with new config |
//! | personal key | one principal | logout |
//!
//! The HMAC key is `server_secret ‖ personal_key`. Rotating the personal key
//! revokes that principal's tokens in O(1) without storing issued tokens.

pub mod codec;
pub mod error;
pub mod keys;
pub mod revocation;
pub mod service;

pub use error::{RevocationError, TokenError};
pub use keys::PersonalKey;
pub use revocation::revoke;
pub use service::{SessionTokens, TokenService};
