//! Server configuration from environment variables.
//!
//! # Invariants
//! - Every setting has a default except the optional directories.
//! - Malformed values are reported as `ConfigError`, never panics.

use libris_core::auth::{DEFAULT_ROUNDS, MIN_ROUNDS};
use libris_core::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "libris.sqlite3";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_POOL_SIZE: u32 = 8;

/// Loads `.env.<RUN_MODE>` when `RUN_MODE` is set, else `.env`.
///
/// A missing file is not an error; real environment variables win.
pub fn load_dotenv() {
    let env_filename = std::env::var("RUN_MODE")
        .map(|mode| format!(".env.{mode}"))
        .unwrap_or_else(|_| ".env".into());

    dotenvy::from_filename(env_filename).ok();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub pool_size: u32,
    pub log_level: String,
    /// Absolute log directory; stderr logging when unset.
    pub log_dir: Option<String>,
    /// Directory served for non-API paths.
    pub static_dir: Option<PathBuf>,
    pub hash_rounds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} `{}`: {}", self.key, self.value, self.reason)
    }
}

impl Error for ConfigError {}

impl ServerConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_text = get("LIBRIS_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_text.parse().map_err(|err| ConfigError {
            key: "LIBRIS_BIND_ADDR",
            value: bind_text.clone(),
            reason: format!("{err}"),
        })?;

        let pool_size = match get("LIBRIS_POOL_SIZE") {
            Some(text) => parse_bounded("LIBRIS_POOL_SIZE", &text, 1)?,
            None => DEFAULT_POOL_SIZE,
        };
        let hash_rounds = match get("LIBRIS_HASH_ROUNDS") {
            Some(text) => parse_bounded("LIBRIS_HASH_ROUNDS", &text, MIN_ROUNDS)?,
            None => DEFAULT_ROUNDS,
        };

        Ok(Self {
            db_path: get("LIBRIS_DB_PATH")
                .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
                .into(),
            bind_addr,
            pool_size,
            log_level: get("LIBRIS_LOG_LEVEL").unwrap_or_else(|| default_log_level().to_string()),
            log_dir: get("LIBRIS_LOG_DIR"),
            static_dir: get("LIBRIS_STATIC_DIR").map(PathBuf::from),
            hash_rounds,
        })
    }
}

fn parse_bounded(key: &'static str, text: &str, min: u32) -> Result<u32, ConfigError> {
    let value: u32 = text.parse().map_err(|err| ConfigError {
        key,
        value: text.to_string(),
        reason: format!("{err}"),
    })?;
    if value < min {
        return Err(ConfigError {
            key,
            value: text.to_string(),
            reason: format!("must be at least {min}"),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{ServerConfig, DEFAULT_POOL_SIZE};
    use libris_core::auth::DEFAULT_ROUNDS;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, super::ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.db_path.to_str(), Some("libris.sqlite3"));
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.hash_rounds, DEFAULT_ROUNDS);
        assert!(config.log_dir.is_none());
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("LIBRIS_DB_PATH", "  "), ("LIBRIS_POOL_SIZE", "")]).unwrap();
        assert_eq!(config.db_path.to_str(), Some("libris.sqlite3"));
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn explicit_values_are_used() {
        let config = config_from(&[
            ("LIBRIS_BIND_ADDR", "127.0.0.1:8080"),
            ("LIBRIS_POOL_SIZE", "2"),
            ("LIBRIS_HASH_ROUNDS", "5000"),
            ("LIBRIS_LOG_LEVEL", "warn"),
            ("LIBRIS_STATIC_DIR", "public"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.hash_rounds, 5000);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.static_dir.unwrap().to_str(), Some("public"));
    }

    #[test]
    fn malformed_values_are_errors() {
        let err = config_from(&[("LIBRIS_BIND_ADDR", "not-an-addr")]).unwrap_err();
        assert_eq!(err.key, "LIBRIS_BIND_ADDR");

        let err = config_from(&[("LIBRIS_POOL_SIZE", "0")]).unwrap_err();
        assert_eq!(err.key, "LIBRIS_POOL_SIZE");

        let err = config_from(&[("LIBRIS_HASH_ROUNDS", "10")]).unwrap_err();
        assert!(err.reason.contains("at least"));
    }
}
