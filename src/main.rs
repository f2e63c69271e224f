//! credits-connect-back binary entrypoint wiring the REST API, metadata provider, and history store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use credits_connect_back::{
    config::AppConfig,
    dao::{
        history_store::{HistoryStore, memory::InMemoryHistoryStore},
        storage::StorageError,
    },
    entitlement::DailyAllowanceGate,
    metadata::{MetadataProvider, ProviderLimits, catalog::StaticCatalog},
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let metadata = build_metadata_provider(&config);
    let gate = DailyAllowanceGate::new(config.daily_round_limit, config.subscribers.clone());

    let app_state = AppState::new(config, metadata, Arc::new(gate));
    spawn_history_supervisor(app_state.clone());

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Pick the metadata provider: TMDB when an API key is present, otherwise the
/// configured catalog file.
fn build_metadata_provider(config: &AppConfig) -> Arc<dyn MetadataProvider> {
    let limits = ProviderLimits {
        cast_limit: config.cast_limit,
        filmography_limit: config.filmography_limit,
    };

    if let Some(provider) = tmdb_provider(limits) {
        return provider;
    }

    let Some(path) = config.catalog_path.as_deref() else {
        warn!("no metadata source configured; serving an empty catalog");
        return Arc::new(StaticCatalog::empty(limits));
    };

    match StaticCatalog::load(path, limits) {
        Ok(catalog) => {
            info!(path = %path.display(), movies = catalog.len(), "loaded movie catalog");
            Arc::new(catalog)
        }
        Err(err) => {
            warn!(error = %err, "failed to load movie catalog; serving an empty catalog");
            Arc::new(StaticCatalog::empty(limits))
        }
    }
}

#[cfg(feature = "tmdb")]
fn tmdb_provider(limits: ProviderLimits) -> Option<Arc<dyn MetadataProvider>> {
    use credits_connect_back::metadata::tmdb::{TmdbConfig, TmdbProvider};

    env::var_os("TMDB_API_KEY")?;
    match TmdbConfig::from_env().and_then(|config| TmdbProvider::new(config, limits)) {
        Ok(provider) => {
            info!("using TMDB metadata provider");
            Some(Arc::new(provider))
        }
        Err(err) => {
            warn!(error = %err, "failed to configure TMDB provider; falling back to catalog");
            None
        }
    }
}

#[cfg(not(feature = "tmdb"))]
fn tmdb_provider(_limits: ProviderLimits) -> Option<Arc<dyn MetadataProvider>> {
    None
}

/// Supervise the history backend selected by the environment: CouchDB when
/// `COUCH_BASE_URL` is set, MongoDB when `MONGO_URI` is set, memory otherwise.
fn spawn_history_supervisor(state: SharedState) {
    #[cfg(feature = "couch-store")]
    {
        use credits_connect_back::dao::history_store::couchdb::{CouchConfig, CouchHistoryStore};

        if env::var_os("COUCH_BASE_URL").is_some() {
            info!("recording history in CouchDB");
            tokio::spawn(storage_supervisor::run(state, || async {
                let config = CouchConfig::from_env()?;
                let store = CouchHistoryStore::connect(config).await?;
                Ok::<_, StorageError>(Arc::new(store) as Arc<dyn HistoryStore>)
            }));
            return;
        }
    }

    #[cfg(feature = "mongo-store")]
    {
        use credits_connect_back::dao::history_store::mongodb::{MongoConfig, MongoHistoryStore};

        if env::var_os("MONGO_URI").is_some() {
            info!("recording history in MongoDB");
            tokio::spawn(storage_supervisor::run(state, || async {
                let config = MongoConfig::from_env().await?;
                let store = MongoHistoryStore::connect(config).await?;
                Ok::<_, StorageError>(Arc::new(store) as Arc<dyn HistoryStore>)
            }));
            return;
        }
    }

    warn!("no history database configured; completed connections are kept in memory");
    tokio::spawn(storage_supervisor::run(state, || async {
        Ok::<_, StorageError>(Arc::new(InMemoryHistoryStore::new()) as Arc<dyn HistoryStore>)
    }));
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
