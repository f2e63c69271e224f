pub mod game;
pub mod state_machine;

use std::{sync::Arc, time::SystemTime};

use dashmap::DashMap;
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::history_store::HistoryStore,
    entitlement::EntitlementGate,
    error::ServiceError,
    metadata::MetadataProvider,
    state::state_machine::GameState,
};

pub type SharedState = Arc<AppState>;

/// Round currently being played by an account.
#[derive(Debug, Clone)]
pub struct ActiveRound {
    /// Identifier handed to the client, changes whenever a new round starts.
    pub id: Uuid,
    pub state: GameState,
    pub started_at: SystemTime,
}

impl ActiveRound {
    /// Wrap a freshly started game state.
    pub fn new(state: GameState) -> Self {
        Self {
            id: Uuid::new_v4(),
            state,
            started_at: SystemTime::now(),
        }
    }
}

/// Central application state holding the collaborators and the rounds in flight.
pub struct AppState {
    config: AppConfig,
    history_store: RwLock<Option<Arc<dyn HistoryStore>>>,
    metadata: Arc<dyn MetadataProvider>,
    entitlements: Arc<dyn EntitlementGate>,
    rounds: DashMap<String, ActiveRound>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a history store is installed.
    pub fn new(
        config: AppConfig,
        metadata: Arc<dyn MetadataProvider>,
        entitlements: Arc<dyn EntitlementGate>,
    ) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            history_store: RwLock::new(None),
            metadata,
            entitlements,
            rounds: DashMap::new(),
            degraded: degraded_tx,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Metadata provider used to resolve seeds and candidates.
    pub fn metadata(&self) -> Arc<dyn MetadataProvider> {
        self.metadata.clone()
    }

    /// Gate deciding whether accounts may start rounds.
    pub fn entitlements(&self) -> Arc<dyn EntitlementGate> {
        self.entitlements.clone()
    }

    /// Rounds in flight, keyed by account.
    pub fn rounds(&self) -> &DashMap<String, ActiveRound> {
        &self.rounds
    }

    /// Obtain a handle to the current history store, if one is installed.
    pub async fn history_store(&self) -> Option<Arc<dyn HistoryStore>> {
        let guard = self.history_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the history store or fail with [`ServiceError::Degraded`].
    pub async fn require_history_store(&self) -> Result<Arc<dyn HistoryStore>, ServiceError> {
        self.history_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new history store implementation and leave degraded mode.
    pub async fn set_history_store(&self, store: Arc<dyn HistoryStore>) {
        {
            let mut guard = self.history_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }
}
