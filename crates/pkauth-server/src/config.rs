use pkauth_core::{AuthSettings, ServerSecret};
use serde::Deserialize;
use std::{env, fs, io::ErrorKind, path::Path, path::PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address, e.g. "0.0.0.0:3000"
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Path to the SQLite file holding principals.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_database_path() -> String {
    "data/pkauth.sqlite".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            database_path: default_database_path(),
        }
    }
}

/// Load `config.toml` (or `$PKAUTH_SERVER_CONFIG`), apply env overrides and validate.
///
/// A missing file is not an error: defaults plus env vars are enough as long as
/// `PKAUTH_SECRET` is set.
pub fn load_config() -> anyhow::Result<AppConfig> {
    let mut cfg = load_config_file(&config_path())?;
    apply_env_overrides(&mut cfg, |key| env::var(key).ok());
    cfg.auth.validate()?;
    Ok(cfg)
}

pub fn load_config_file(path: &Path) -> anyhow::Result<AppConfig> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(toml::from_str(&raw)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            Ok(AppConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Env vars win over the file:
/// - `PKAUTH_SECRET` → `[auth].secret`
/// - `PKAUTH_TOKEN_TTL` → `[auth].token_ttl`
/// - `PKAUTH_BIND` → `[server].bind`
pub fn apply_env_overrides(cfg: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(secret) = lookup("PKAUTH_SECRET").filter(|s| !s.trim().is_empty()) {
        cfg.auth.secret = ServerSecret::new(secret);
    }
    if let Some(ttl) = lookup("PKAUTH_TOKEN_TTL").filter(|s| !s.trim().is_empty()) {
        cfg.auth.token_ttl = ttl;
    }
    if let Some(bind) = lookup("PKAUTH_BIND").filter(|s| !s.trim().is_empty()) {
        cfg.server.bind = bind;
    }
}

fn config_path() -> PathBuf {
    if let Ok(p) = env::var("PKAUTH_SERVER_CONFIG") {
        return PathBuf::from(p);
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_file_with_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [auth]
            secret = "from-file"
            "#
        )
        .unwrap();

        let cfg = load_config_file(file.path()).unwrap();
        assert_eq!(cfg.auth.secret.expose(), "from-file");
        assert_eq!(cfg.auth.token_ttl, "1h");
        assert_eq!(cfg.server.bind, "0.0.0.0:3000");
        assert_eq!(cfg.server.database_path, "data/pkauth.sqlite");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_file(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.auth.secret.is_blank());
    }

    #[test]
    fn env_overrides_file() {
        let mut cfg = AppConfig::default();
        let env: HashMap<&str, &str> = HashMap::from([
            ("PKAUTH_SECRET", "from-env"),
            ("PKAUTH_TOKEN_TTL", "15m"),
            ("PKAUTH_BIND", "127.0.0.1:9000"),
        ]);
        apply_env_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.auth.secret.expose(), "from-env");
        assert_eq!(cfg.auth.token_ttl, "15m");
        assert_eq!(cfg.server.bind, "127.0.0.1:9000");
        assert!(cfg.auth.validate().is_ok());
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut cfg = AppConfig::default();
        cfg.auth.secret = ServerSecret::new("kept");
        apply_env_overrides(&mut cfg, |_| Some("  ".to_string()));
        assert_eq!(cfg.auth.secret.expose(), "kept");
        assert_eq!(cfg.auth.token_ttl, "1h");
    }

    #[test]
    fn debug_output_never_contains_secret() {
        let mut cfg = AppConfig::default();
        cfg.auth.secret = ServerSecret::new("hunter2-hunter2");
        assert!(!format!("{:?}", cfg).contains("hunter2"));
    }
}
