use std::env;

use super::error::{CouchDaoError, CouchResult};

const DEFAULT_DATABASE: &str = "credits_connect";

/// Location of the history database and the basic-auth pair used to reach it.
#[derive(Debug, Clone)]
pub struct CouchConfig {
    /// Server URL without trailing slash.
    pub base_url: String,
    /// Database holding the `connection::{uuid}` documents.
    pub database: String,
    /// Username and password, when the server requires them.
    pub credentials: Option<(String, String)>,
}

impl CouchConfig {
    /// Point at `base_url`, using the default `credits_connect` database.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            database: DEFAULT_DATABASE.to_string(),
            credentials: None,
        }
    }

    /// Store the history in another database.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Authenticate every request with basic auth.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Read `COUCH_BASE_URL` (required), `COUCH_DB`, `COUCH_USERNAME` and `COUCH_PASSWORD`.
    pub fn from_env() -> CouchResult<Self> {
        let base_url = env::var("COUCH_BASE_URL").map_err(|_| CouchDaoError::MissingEnvVar {
            var: "COUCH_BASE_URL",
        })?;

        let mut config = Self::new(base_url);
        if let Ok(database) = env::var("COUCH_DB") {
            config = config.with_database(database);
        }
        if let (Ok(username), Ok(password)) = (env::var("COUCH_USERNAME"), env::var("COUCH_PASSWORD"))
        {
            config = config.with_credentials(username, password);
        }
        Ok(config)
    }

    pub(super) fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_the_history_database() {
        let config = CouchConfig::new("http://couch:5984/");
        assert_eq!(config.database_url(), "http://couch:5984/credits_connect");
        assert!(config.credentials.is_none());

        let config = config
            .with_database("history")
            .with_credentials("admin", "secret");
        assert_eq!(config.database_url(), "http://couch:5984/history");
        assert_eq!(
            config.credentials,
            Some(("admin".to_string(), "secret".to_string()))
        );
    }
}
