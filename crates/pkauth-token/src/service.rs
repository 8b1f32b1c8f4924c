//! Token service: codec + derived per-principal secret.

use crate::codec;
use crate::error::TokenError;
use pkauth_core::{AuthSettings, ConfigError, ServerSecret, TokenPayload};
use std::time::Duration;

/// The three token operations the access guard and login flow rely on.
pub trait SessionTokens: Send + Sync {
    /// Sign `payload` under `server_secret ‖ personal_key` with the configured TTL.
    fn sign(&self, payload: &TokenPayload, personal_key: &str) -> Result<String, TokenError>;

    /// Verify `token` under `server_secret ‖ personal_key`.
    fn verify(&self, token: &str, personal_key: &str) -> Result<TokenPayload, TokenError>;

    /// Read the payload without checking the signature.
    ///
    /// Callers must call [`SessionTokens::verify`] before trusting the result.
    fn decode_payload(&self, token: &str) -> Result<TokenPayload, TokenError>;
}

/// Stateless token service. Cheap to clone and safe to share across requests.
#[derive(Debug, Clone)]
pub struct TokenService {
    server_secret: ServerSecret,
    ttl: Duration,
}

impl TokenService {
    pub fn new(server_secret: ServerSecret, ttl: Duration) -> Self {
        Self { server_secret, ttl }
    }

    /// Build from validated settings.
    pub fn from_settings(settings: &AuthSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self::new(settings.secret.clone(), settings.ttl()?))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn signing_secret(&self, personal_key: &str) -> Vec<u8> {
        let server = self.server_secret.expose().as_bytes();
        let mut secret = Vec::with_capacity(server.len() + personal_key.len());
        secret.extend_from_slice(server);
        secret.extend_from_slice(personal_key.as_bytes());
        secret
    }
}

impl SessionTokens for TokenService {
    fn sign(&self, payload: &TokenPayload, personal_key: &str) -> Result<String, TokenError> {
        codec::encode(payload, &self.signing_secret(personal_key), self.ttl)
    }

    fn verify(&self, token: &str, personal_key: &str) -> Result<TokenPayload, TokenError> {
        codec::verify(token, &self.signing_secret(personal_key))
    }

    fn decode_payload(&self, token: &str) -> Result<TokenPayload, TokenError> {
        codec::decode_unverified(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn service(secret: &str) -> TokenService {
        TokenService::new(ServerSecret::new(secret), Duration::from_secs(3600))
    }

    fn payload() -> TokenPayload {
        TokenPayload::new("user-id", "username")
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let tokens = service("secret-string");
        let token = tokens.sign(&payload(), "personal-key").unwrap();
        assert_eq!(tokens.verify(&token, "personal-key").unwrap(), payload());
        assert_eq!(tokens.decode_payload(&token).unwrap(), payload());
    }

    #[test]
    fn test_other_personal_key_is_rejected() {
        let tokens = service("secret-string");
        let token = tokens.sign(&payload(), "key-1").unwrap();
        assert!(matches!(
            tokens.verify(&token, "key-2"),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_other_server_secret_is_rejected() {
        let token = service("secret-a").sign(&payload(), "key").unwrap();
        assert!(matches!(
            service("secret-b").verify(&token, "key"),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_secret_is_concatenation() {
        let tokens = service("server");
        let token = tokens.sign(&payload(), "personal").unwrap();
        assert_eq!(codec::verify(&token, b"serverpersonal").unwrap(), payload());
    }

    #[test]
    fn test_configured_ttl_is_embedded() {
        let tokens = TokenService::new(ServerSecret::new("s"), Duration::from_secs(60));
        let token = tokens.sign(&payload(), "k").unwrap();

        let later = Utc::now() + chrono::Duration::seconds(120);
        assert!(matches!(
            codec::verify_at(&token, b"sk", later),
            Err(TokenError::Expired { .. })
        ));
    }

    #[test]
    fn test_from_settings_validates() {
        assert!(TokenService::from_settings(&AuthSettings::new("", "1h")).is_err());
        assert!(TokenService::from_settings(&AuthSettings::new("s", "nope")).is_err());

        let tokens = TokenService::from_settings(&AuthSettings::new("s", "15m")).unwrap();
        assert_eq!(tokens.ttl(), Duration::from_secs(900));
    }

    #[test]
    fn test_debug_hides_server_secret() {
        let debug = format!("{:?}", service("very-secret"));
        assert!(!debug.contains("very-secret"));
    }
}
