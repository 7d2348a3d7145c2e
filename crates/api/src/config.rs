//! Process configuration, read from environment variables.

use std::net::SocketAddr;

use dreamteam_observability::LogFormat;
use thiserror::Error;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 480;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Credentials of the admin account created at startup when it is missing.
#[derive(Clone, PartialEq, Eq)]
pub struct SeedAdmin {
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind: SocketAddr,
    /// SQLite URL. `None` keeps everything in memory.
    pub database_url: Option<String>,
    pub session_ttl: chrono::Duration,
    pub log_format: LogFormat,
    pub seed_admin: Option<SeedAdmin>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            session_ttl: chrono::Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
            log_format: LogFormat::default(),
            seed_admin: None,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset and blank values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(raw) = get("DREAMTEAM_BIND") {
            config.bind = raw
                .parse()
                .map_err(|_| ConfigError::invalid("DREAMTEAM_BIND", format!("`{raw}` is not a socket address")))?;
        }

        config.database_url = get("DATABASE_URL");

        if let Some(raw) = get("SESSION_TTL_MINUTES") {
            let minutes: i64 = raw
                .parse()
                .map_err(|_| ConfigError::invalid("SESSION_TTL_MINUTES", format!("`{raw}` is not a number")))?;
            if minutes <= 0 {
                return Err(ConfigError::invalid("SESSION_TTL_MINUTES", "must be positive"));
            }
            config.session_ttl = chrono::Duration::minutes(minutes);
        }

        if let Some(raw) = get("LOG_FORMAT") {
            config.log_format = raw
                .parse()
                .map_err(|e: dreamteam_observability::UnknownLogFormat| ConfigError::invalid("LOG_FORMAT", e.to_string()))?;
        }

        if let Some(raw) = get("DREAMTEAM_SEED_ADMIN") {
            let (username, password) = raw
                .split_once(':')
                .filter(|(u, p)| !u.is_empty() && !p.is_empty())
                .ok_or_else(|| ConfigError::invalid("DREAMTEAM_SEED_ADMIN", "expected `username:password`"))?;
            config.seed_admin = Some(SeedAdmin {
                username: username.to_string(),
                password: password.to_string(),
            });
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert_eq!(config.session_ttl, chrono::Duration::minutes(480));
    }

    #[test]
    fn reads_every_key() {
        let config = load(&[
            ("DREAMTEAM_BIND", "127.0.0.1:3000"),
            ("DATABASE_URL", "sqlite://dreamteam.db?mode=rwc"),
            ("SESSION_TTL_MINUTES", "15"),
            ("LOG_FORMAT", "pretty"),
            ("DREAMTEAM_SEED_ADMIN", "root:s3:cret"),
        ])
        .unwrap();

        assert_eq!(config.bind.port(), 3000);
        assert_eq!(config.database_url.as_deref(), Some("sqlite://dreamteam.db?mode=rwc"));
        assert_eq!(config.session_ttl, chrono::Duration::minutes(15));
        assert_eq!(config.log_format, LogFormat::Pretty);
        let seed = config.seed_admin.unwrap();
        assert_eq!(seed.username, "root");
        assert_eq!(seed.password, "s3:cret");
        assert!(!format!("{seed:?}").contains("s3:cret"));
    }

    #[test]
    fn rejects_bad_values() {
        let err = load(&[("SESSION_TTL_MINUTES", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SESSION_TTL_MINUTES", .. }));

        let err = load(&[("DREAMTEAM_BIND", "localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DREAMTEAM_BIND", .. }));

        let err = load(&[("LOG_FORMAT", "xml")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "LOG_FORMAT", .. }));

        let err = load(&[("DREAMTEAM_SEED_ADMIN", "nopassword")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DREAMTEAM_SEED_ADMIN", .. }));
    }
}
