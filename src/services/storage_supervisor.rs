use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{history_store::HistoryStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Connect to the history backend and keep it healthy, holding the shared state in degraded
/// mode whenever completed connections cannot be recorded.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn HistoryStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.set_history_store(store.clone()).await;
                info!("history store connected; leaving degraded mode");
                delay = INITIAL_DELAY;

                watch_health(&state, store.as_ref()).await;
                warn!("history store lost; reconnecting from scratch");
            }
            Err(err) => {
                warn!(error = %err, "history store connection attempt failed");
            }
        }

        sleep(delay).await;
        delay = (delay * 2).min(MAX_DELAY);
    }
}

/// Poll the store until it fails and cannot be revived in place.
async fn watch_health(state: &SharedState, store: &dyn HistoryStore) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded().await {
                    info!("history store healthy again; leaving degraded mode");
                    state.update_degraded(false).await;
                }
            }
            Err(err) => {
                warn!(error = %err, "history store health check failed");
                if !revive(state, store).await {
                    warn!("exhausted history store reconnect attempts; staying in degraded mode");
                    return;
                }
                state.update_degraded(false).await;
            }
        }
        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

/// Retry the store's own reconnect with exponential backoff.
async fn revive(state: &SharedState, store: &dyn HistoryStore) -> bool {
    let mut delay = INITIAL_DELAY;

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "history store reconnected after health check failure");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(
                        attempt, error = %err,
                        "history store reconnect first attempt failed; entering degraded mode"
                    );
                    state.update_degraded(true).await;
                } else {
                    warn!(attempt, error = %err, "history store reconnect attempt failed");
                }
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig, dao::history_store::memory::InMemoryHistoryStore,
        metadata::catalog::tests::catalog, services::tests::test_state_with,
    };

    #[tokio::test]
    async fn installs_the_connected_store() {
        let state = test_state_with(AppConfig::default(), Arc::new(catalog()), None).await;
        let mut degraded = state.degraded_watcher();
        assert!(state.is_degraded().await);

        let task = tokio::spawn(run(state.clone(), || async {
            Ok(Arc::new(InMemoryHistoryStore::new()) as Arc<dyn HistoryStore>)
        }));

        tokio::time::timeout(Duration::from_secs(2), degraded.wait_for(|value| !*value))
            .await
            .unwrap()
            .unwrap();
        assert!(state.require_history_store().await.is_ok());
        task.abort();
    }
}
