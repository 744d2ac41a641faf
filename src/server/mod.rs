//! HTTP API - crawl submission over axum.

pub mod dto;
pub mod error;
pub mod routes;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::crawler::Coordinator;
use crate::ScoutError;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub config: Arc<Config>,
    pub coordinator: Coordinator,
    /// Parent of every per-request crawl token
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config, coordinator: Coordinator, shutdown: CancellationToken) -> Self {
        Self {
            config: Arc::new(config),
            coordinator,
            shutdown,
        }
    }
}

/// Serves the API on `server.bind` until `shutdown` is cancelled
///
/// Cancelling `shutdown` also cancels in-flight crawls, which persist what they
/// found and answer with an error.
pub async fn serve(config: Config, shutdown: CancellationToken) -> Result<(), ScoutError> {
    let coordinator = Coordinator::from_config(&config)?;
    let addr = config.server.bind.clone();
    let state = Arc::new(AppState::new(config, coordinator, shutdown.clone()));

    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Starting server on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
