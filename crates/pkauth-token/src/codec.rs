//! Compact token encoding and verification.
//!
//! Tokens are HS256 JWS strings (`header.payload.signature`, base64url). The
//! claims are the [`TokenPayload`] fields plus `iat` and `exp` in seconds.

use crate::error::TokenError;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use pkauth_core::TokenPayload;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionClaims {
    #[serde(flatten)]
    payload: TokenPayload,
    iat: i64,
    exp: i64,
}

/// Sign `payload` with `secret`, expiring `ttl` from now.
pub fn encode(payload: &TokenPayload, secret: &[u8], ttl: Duration) -> Result<String, TokenError> {
    encode_at(payload, secret, ttl, Utc::now())
}

/// Sign `payload` as if issued at `issued_at`.
pub fn encode_at(
    payload: &TokenPayload,
    secret: &[u8],
    ttl: Duration,
    issued_at: DateTime<Utc>,
) -> Result<String, TokenError> {
    let ttl = chrono::Duration::from_std(ttl)
        .map_err(|e| TokenError::SigningFailed(format!("ttl out of range: {e}")))?;
    let expires_at = issued_at
        .checked_add_signed(ttl)
        .ok_or_else(|| TokenError::SigningFailed("time overflow computing expiry".to_string()))?;

    let claims = SessionClaims {
        payload: payload.clone(),
        iat: issued_at.timestamp(),
        exp: expires_at.timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| TokenError::SigningFailed(e.to_string()))
}

/// Read the payload WITHOUT checking the signature.
///
/// Only good for finding out which principal's key to verify with. The result
/// is attacker-controlled until [`verify`] succeeds.
pub fn decode_unverified(token: &str) -> Result<TokenPayload, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::malformed("token must have 3 parts separated by dots"));
    }

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| TokenError::malformed(format!("failed to decode payload: {e}")))?;

    let claims: SessionClaims = serde_json::from_slice(&payload_bytes)
        .map_err(|e| TokenError::malformed(format!("failed to parse claims: {e}")))?;

    Ok(claims.payload)
}

/// Check the signature against `secret`, then the expiry against the wall clock.
pub fn verify(token: &str, secret: &[u8]) -> Result<TokenPayload, TokenError> {
    verify_at(token, secret, Utc::now())
}

/// Like [`verify`] with an explicit clock.
///
/// The signature is checked first, so a token that is both expired and signed
/// under a rotated key reports `InvalidSignature`.
pub fn verify_at(
    token: &str,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<TokenPayload, TokenError> {
    let claims = decode_signed(token, secret)?;

    if now.timestamp() >= claims.exp {
        let expired_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or_default();
        return Err(TokenError::Expired { expired_at });
    }

    Ok(claims.payload)
}

fn decode_signed(token: &str, secret: &[u8]) -> Result<SessionClaims, TokenError> {
    // Expiry is checked by the caller against an injectable clock.
    let mut validation = Validation::new(ALGORITHM);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();
    validation.leeway = 0;

    jsonwebtoken::decode::<SessionClaims>(token, &DecodingKey::from_secret(secret), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed(e.to_string()),
        })
}
