//! Auth configuration consumed by the token layer.
//!
//! ```toml
//! [auth]
//! secret = "a-long-random-string"
//! token_ttl = "1h"
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Process-wide signing secret.
///
/// Never printed: `Debug` and `Display` both render `[redacted]`.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ServerSecret(String);

impl ServerSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ServerSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ServerSecret([redacted])")
    }
}

impl fmt::Display for ServerSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// Server-wide signing secret. For security: prefer setting env var
    /// `PKAUTH_SECRET`.
    #[serde(default)]
    pub secret: ServerSecret,

    /// Token time-to-live as a duration string, e.g. "1h", "30m", "7days".
    #[serde(default = "default_token_ttl")]
    pub token_ttl: String,
}

fn default_token_ttl() -> String {
    "1h".to_string()
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            secret: ServerSecret::default(),
            token_ttl: default_token_ttl(),
        }
    }
}

impl AuthSettings {
    pub fn new(secret: impl Into<String>, token_ttl: impl Into<String>) -> Self {
        Self {
            secret: ServerSecret::new(secret),
            token_ttl: token_ttl.into(),
        }
    }

    /// Parse `token_ttl`. Zero is rejected since every token would be born expired.
    pub fn ttl(&self) -> Result<Duration, ConfigError> {
        let ttl = humantime::parse_duration(self.token_ttl.trim()).map_err(|e| {
            ConfigError::InvalidTtl {
                value: self.token_ttl.clone(),
                reason: e.to_string(),
            }
        })?;
        if ttl.is_zero() {
            return Err(ConfigError::InvalidTtl {
                value: self.token_ttl.clone(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(ttl)
    }

    /// Check that both required settings are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_blank() {
            return Err(ConfigError::MissingSecret);
        }
        self.ttl()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_humantime_ttl() {
        let settings = AuthSettings::new("s3cret", "30m");
        assert_eq!(settings.ttl().unwrap(), Duration::from_secs(30 * 60));

        let settings = AuthSettings::new("s3cret", "7days");
        assert_eq!(settings.ttl().unwrap(), Duration::from_secs(7 * 24 * 3600));
    }

    #[test]
    fn rejects_bad_or_zero_ttl() {
        let settings = AuthSettings::new("s3cret", "soon");
        assert!(matches!(settings.ttl(), Err(ConfigError::InvalidTtl { .. })));

        let settings = AuthSettings::new("s3cret", "0s");
        assert!(matches!(settings.validate(), Err(ConfigError::InvalidTtl { .. })));
    }

    #[test]
    fn blank_secret_fails_validation() {
        let settings = AuthSettings::new("   ", "1h");
        assert!(matches!(settings.validate(), Err(ConfigError::MissingSecret)));
        assert!(AuthSettings::default().validate().is_err());
    }

    #[test]
    fn secret_is_never_printed() {
        let settings = AuthSettings::new("top-secret-value", "1h");
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("top-secret-value"));
        assert!(debug.contains("[redacted]"));
        assert_eq!(settings.secret.to_string(), "[redacted]");
    }
}
