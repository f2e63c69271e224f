//! Application-level configuration loading: gameplay limits, entitlement allowances, and the
//! optional offline catalog.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "CREDITS_CONNECT_CONFIG_PATH";

const DEFAULT_CAST_LIMIT: usize = 10;
const DEFAULT_METADATA_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_RANDOM_PAIR_ATTEMPTS: u32 = 5;
const DEFAULT_DAILY_ROUND_LIMIT: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Number of top-billed cast members kept for each movie.
    pub cast_limit: usize,
    /// Optional cap on the number of films listed for an actor.
    pub filmography_limit: Option<usize>,
    /// Upper bound for a single metadata lookup.
    pub metadata_timeout: Duration,
    /// How many times the random pair picker re-rolls when both picks collide.
    pub random_pair_attempts: u32,
    /// Rounds a non-subscriber may start per UTC day.
    pub daily_round_limit: u32,
    /// Accounts holding an active subscription.
    pub subscribers: Vec<String>,
    /// JSON catalog used when no online metadata provider is configured.
    pub catalog_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        cast_limit = config.cast_limit,
                        daily_round_limit = config.daily_round_limit,
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; absent keys keep their default value.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    cast_limit: usize,
    filmography_limit: Option<usize>,
    metadata_timeout_ms: u64,
    random_pair_attempts: u32,
    daily_round_limit: u32,
    subscribers: Vec<String>,
    catalog_path: Option<PathBuf>,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            cast_limit: DEFAULT_CAST_LIMIT,
            filmography_limit: None,
            metadata_timeout_ms: DEFAULT_METADATA_TIMEOUT_MS,
            random_pair_attempts: DEFAULT_RANDOM_PAIR_ATTEMPTS,
            daily_round_limit: DEFAULT_DAILY_ROUND_LIMIT,
            subscribers: Vec::new(),
            catalog_path: None,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            cast_limit: value.cast_limit.max(1),
            filmography_limit: value.filmography_limit,
            metadata_timeout: Duration::from_millis(value.metadata_timeout_ms),
            random_pair_attempts: value.random_pair_attempts.max(1),
            daily_round_limit: value.daily_round_limit,
            subscribers: value.subscribers,
            catalog_path: value.catalog_path.filter(|path| !path.as_os_str().is_empty()),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.cast_limit, 10);
        assert_eq!(config.metadata_timeout, Duration::from_secs(5));
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = AppConfig::from_json(
            r#"{ "cast_limit": 5, "daily_round_limit": 1, "subscribers": ["uid-1"] }"#,
        )
        .unwrap();

        assert_eq!(config.cast_limit, 5);
        assert_eq!(config.daily_round_limit, 1);
        assert_eq!(config.subscribers, vec!["uid-1".to_string()]);
        assert_eq!(config.random_pair_attempts, 5);
    }

    #[test]
    fn degenerate_limits_are_clamped() {
        let config =
            AppConfig::from_json(r#"{ "cast_limit": 0, "random_pair_attempts": 0 }"#).unwrap();
        assert_eq!(config.cast_limit, 1);
        assert_eq!(config.random_pair_attempts, 1);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(AppConfig::from_json("{ \"cast_limit\": \"ten\" }").is_err());
    }
}
