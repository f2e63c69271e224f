use super::error::{TmdbError, TmdbResult};

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_LANGUAGE: &str = "en-US";

/// Runtime configuration describing how to reach The Movie Database API.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub base_url: String,
    pub api_key: String,
    pub language: String,
}

impl TmdbConfig {
    /// Construct a configuration targeting the public API endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Point the configuration at another API root (proxies, mocks).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> TmdbResult<Self> {
        let api_key = std::env::var("TMDB_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(TmdbError::MissingEnvVar {
                var: "TMDB_API_KEY",
            })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("TMDB_BASE_URL") {
            config = config.with_base_url(base_url);
        }

        Ok(config)
    }
}
