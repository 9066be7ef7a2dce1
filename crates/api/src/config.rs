//! Process configuration, read once from the environment at startup.

use std::fmt;
use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use inventorix_auth::DEFAULT_MAX_AGE_SECS;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5555";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SECRET_KEY must be set to a non-empty value")]
    MissingSecret,

    #[error("DATABASE_URL must be set when USE_PERSISTENT_STORES is enabled")]
    MissingDatabaseUrl,

    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Which record store backs the process.
#[derive(Clone, PartialEq, Eq)]
pub enum Persistence {
    InMemory,
    Postgres { database_url: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub secret: String,
    pub bind_addr: SocketAddr,
    pub token_max_age: Duration,
    pub persistence: Persistence,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let secret = get("SECRET_KEY").ok_or(ConfigError::MissingSecret)?;

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let token_max_age = match get("TOKEN_MAX_AGE_SECS") {
            None => Duration::seconds(DEFAULT_MAX_AGE_SECS),
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .and_then(Duration::try_seconds)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "TOKEN_MAX_AGE_SECS",
                    reason: format!("expected a positive number of seconds in range, got {raw:?}"),
                })?,
        };

        let persistent = match get("USE_PERSISTENT_STORES").as_deref() {
            None => false,
            Some(v) => parse_bool(v).ok_or_else(|| ConfigError::Invalid {
                key: "USE_PERSISTENT_STORES",
                reason: format!("expected true or false, got {v:?}"),
            })?,
        };
        let persistence = if persistent {
            Persistence::Postgres {
                database_url: get("DATABASE_URL").ok_or(ConfigError::MissingDatabaseUrl)?,
            }
        } else {
            Persistence::InMemory
        };

        Ok(Self {
            secret,
            bind_addr,
            token_max_age,
            persistence,
        })
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl fmt::Debug for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMemory => f.write_str("InMemory"),
            Self::Postgres { .. } => f.write_str("Postgres { database_url: <redacted> }"),
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("secret", &"<redacted>")
            .field("bind_addr", &self.bind_addr)
            .field("token_max_age_secs", &self.token_max_age.num_seconds())
            .field("persistence", &self.persistence)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = load(&[("SECRET_KEY", "s3cret")]).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(config.token_max_age, Duration::seconds(3600));
        assert!(config.persistence == Persistence::InMemory);
    }

    #[test]
    fn missing_or_blank_secret_is_fatal() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::MissingSecret);
        assert_eq!(load(&[("SECRET_KEY", "  ")]).unwrap_err(), ConfigError::MissingSecret);
    }

    #[test]
    fn max_age_must_be_positive() {
        for bad in ["0", "-5", "soon"] {
            let err = load(&[("SECRET_KEY", "k"), ("TOKEN_MAX_AGE_SECS", bad)]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: "TOKEN_MAX_AGE_SECS", .. }));
        }
    }

    #[test]
    fn out_of_range_max_age_is_rejected_not_panicking() {
        for huge in ["9223372036854775807", "9223372036854776"] {
            let err = load(&[("SECRET_KEY", "k"), ("TOKEN_MAX_AGE_SECS", huge)]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: "TOKEN_MAX_AGE_SECS", .. }));
        }

        let config = load(&[("SECRET_KEY", "k"), ("TOKEN_MAX_AGE_SECS", "86400")]).unwrap();
        assert_eq!(config.token_max_age, Duration::days(1));
    }

    #[test]
    fn persistent_stores_need_a_database_url() {
        let err = load(&[("SECRET_KEY", "k"), ("USE_PERSISTENT_STORES", "true")]).unwrap_err();
        assert_eq!(err, ConfigError::MissingDatabaseUrl);

        let config = load(&[
            ("SECRET_KEY", "k"),
            ("USE_PERSISTENT_STORES", "1"),
            ("DATABASE_URL", "postgres://u:p@db/inv"),
        ])
        .unwrap();
        assert!(matches!(config.persistence, Persistence::Postgres { .. }));
    }

    #[test]
    fn debug_hides_secrets() {
        let config = load(&[
            ("SECRET_KEY", "hunter2"),
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://u:pw@db/inv"),
        ])
        .unwrap();
        let shown = format!("{config:?}");
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("pw@db"));
    }
}
