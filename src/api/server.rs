use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use super::services;
use super::state::AppState;
use crate::config::Config;
use crate::observability::Metrics;
use crate::pipeline::Pipeline;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the ingress router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events", post(services::ingest_events))
        .route("/metrics", get(services::metrics))
        .route("/health", get(services::health))
        .with_state(state)
}

/// Wire up the pipeline from config and serve until shutdown
pub async fn run(config: Config, address: SocketAddr) -> Result<(), AnyError> {
    let metrics = Arc::new(Metrics::new());
    let pipeline = Pipeline::from_config(&config, metrics.clone())?;
    let state = AppState::new(config, pipeline, metrics);

    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "AttachBox server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
