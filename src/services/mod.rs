/// OpenAPI documentation generation.
pub mod documentation;
/// Round allowance lookups.
pub mod entitlement_service;
/// Health check service.
pub mod health_service;
/// Completed connection listing and deletion.
pub mod history_service;
/// Round lifecycle: start, moves, commit and abandon.
pub mod round_service;
/// History store reconnection supervisor.
pub mod storage_supervisor;

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use crate::{
        config::AppConfig,
        dao::history_store::{HistoryStore, memory::InMemoryHistoryStore},
        entitlement::DailyAllowanceGate,
        metadata::{MetadataProvider, catalog::tests::catalog},
        state::{AppState, SharedState},
    };

    /// State backed by the test catalog and an in-memory history store.
    pub(crate) async fn test_state(daily_round_limit: u32) -> SharedState {
        let config = AppConfig {
            daily_round_limit,
            ..AppConfig::default()
        };
        let store: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::new());
        test_state_with(config, Arc::new(catalog()), Some(store)).await
    }

    /// State with explicit collaborators; `None` leaves it in degraded mode.
    pub(crate) async fn test_state_with(
        config: AppConfig,
        metadata: Arc<dyn MetadataProvider>,
        store: Option<Arc<dyn HistoryStore>>,
    ) -> SharedState {
        let gate = DailyAllowanceGate::new(config.daily_round_limit, config.subscribers.clone());
        let state = AppState::new(config, metadata, Arc::new(gate));
        if let Some(store) = store {
            state.set_history_store(store).await;
        }
        state
    }
}
