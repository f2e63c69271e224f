use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether the history store is reachable, logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_history_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "history store health check failed");
                return HealthResponse::degraded();
            }
        }
        Err(_) => warn!("history store unavailable (degraded mode)"),
    }

    if state.is_degraded().await {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        metadata::catalog::tests::catalog,
        services::tests::{test_state, test_state_with},
    };

    #[tokio::test]
    async fn reports_degraded_without_store() {
        let state = test_state_with(AppConfig::default(), Arc::new(catalog()), None).await;
        let health = health_status(&state).await;
        assert_eq!(health.status, "degraded");
        assert!(!health.history_available);

        let state = test_state(3).await;
        assert_eq!(health_status(&state).await.status, "ok");
    }
}
