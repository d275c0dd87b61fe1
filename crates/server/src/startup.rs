use std::sync::Arc;

use axum::Router;
use common::metrics::SNAPSHOT_HYDRATIONS_TOTAL;
use common::utils::logging::init_logging_from_env;
use configs::AppConfig;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;
use service::{
    auth::{AuthService, AuthSettings},
    flusher::FlushWorker,
    push::PushService,
    runtime,
    services::{ArticleService, UnderstandingService},
    storage::{self, SnapshotBackend},
    store::{FlushPolicy, HydrateOutcome, Store},
    uploads::{FileStorage, LocalFileStorage},
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the store and services over `backend`. The store starts empty.
pub fn build_state(cfg: Arc<AppConfig>, backend: Arc<dyn SnapshotBackend>) -> AppState {
    let store = Arc::new(Store::new(backend, FlushPolicy { write_through: cfg.snapshot.write_through }));
    let files: Arc<dyn FileStorage> = Arc::new(LocalFileStorage::new(&cfg.uploads.dir, &cfg.uploads.public_prefix));
    let push = PushService::new(store.clone());
    AppState {
        auth: AuthService::new(store.clone(), AuthSettings::from(&cfg.auth)),
        articles: ArticleService::new(store.clone(), files.clone(), push.clone()),
        understanding: UnderstandingService::new(store.clone(), files),
        push,
        store,
        config: cfg,
    }
}

pub fn build_app(state: AppState) -> Router {
    routes::build_router(state, build_cors())
}

/// Load the latest snapshot. Any failure leaves the store empty and is logged.
pub async fn hydrate_store(store: &Store) {
    match store.hydrate().await {
        Ok(outcome) => {
            SNAPSHOT_HYDRATIONS_TOTAL.with_label_values(&[outcome.label()]).inc();
            if let HydrateOutcome::Restored { last_updated, counts } = outcome {
                info!(%last_updated, ?counts, "store restored from snapshot");
            }
        }
        Err(e) => {
            SNAPSHOT_HYDRATIONS_TOTAL.with_label_values(&["error"]).inc();
            warn!(error = %e, backend = %store.backend().describe(), "snapshot fetch failed, starting empty");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

/// Public entry: build the app and run the HTTP server until a shutdown signal,
/// then stop the flush worker and write a final snapshot.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load().map_err(|e| StartupError::InvalidConfig(format!("{e:#}")))?;
    let cfg = Arc::new(cfg);
    if cfg.auth.uses_dev_secret() {
        warn!("JWT_SECRET is not set; tokens are signed with the built-in development secret");
    }
    runtime::ensure_env(&cfg).await?;

    let backend = storage::from_config(&cfg.snapshot).map_err(StartupError::from)?;
    info!(backend = %backend.describe(), write_through = cfg.snapshot.write_through, "snapshot backend ready");

    let state = build_state(cfg.clone(), backend);
    let store = state.store.clone();
    hydrate_store(&store).await;

    let worker = FlushWorker::spawn(store.clone(), cfg.snapshot.interval());
    let app = build_app(state);

    let addr = cfg.server.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StartupError::InvalidConfig(format!("cannot bind {addr}: {e}")))?;
    info!(%addr, "research portal listening");
    let served = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await;

    worker.stop().await;
    match tokio::time::timeout(cfg.snapshot.shutdown_timeout(), store.flush_if_dirty()).await {
        Ok(Ok(Some(report))) => info!(revision = report.revision, bytes = report.bytes, "final snapshot written"),
        Ok(Ok(None)) => info!("store clean at shutdown"),
        Ok(Err(e)) => error!(error = %e, "final snapshot failed"),
        Err(_) => error!(timeout_secs = cfg.snapshot.shutdown_timeout_secs, "final snapshot timed out"),
    }
    served?;
    Ok(())
}
