use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Whether completed connections can currently be recorded.
    pub history_available: bool,
}

impl HealthResponse {
    /// Every dependency is reachable.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            history_available: true,
        }
    }

    /// Rounds can be played but the history store is unreachable.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
            history_available: false,
        }
    }
}
