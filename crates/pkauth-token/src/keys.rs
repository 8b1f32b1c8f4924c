//! Personal key generation.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use std::fmt;

/// Number of random bytes in a personal key.
const PERSONAL_KEY_BYTES: usize = 32;

/// A per-principal secret fragment.
///
/// Combined with the server secret to derive the signing key. Replacing it
/// invalidates every token signed under the previous value.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonalKey(String);

impl PersonalKey {
    /// Generate a new random personal key (32 bytes, base64url without padding).
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let mut bytes = [0u8; PERSONAL_KEY_BYTES];
        rng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for PersonalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PersonalKey([redacted])")
    }
}

impl From<PersonalKey> for String {
    fn from(key: PersonalKey) -> Self {
        key.0
    }
}
