use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;

use crate::output::{log_report, CrawlReport, ResultSink};
use crate::server::dto::{CrawlRequest, HealthResponse};
use crate::server::error::ApiError;
use crate::server::AppState;

/// Build the full router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    let crawler = Router::new()
        .route("/api/v1/crawler/start", post(start_crawl))
        .route("/api/v1/crawler/report", post(crawl_report));

    Router::new()
        .route("/health", get(health))
        .merge(crawler)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Crawler
// ---------------------------------------------------------------------------

/// Runs a crawl and returns the sorted product URLs.
pub async fn start_crawl(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<CrawlRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let report = run_crawl(&state, body).await?;
    Ok(axum::Json(report.products))
}

/// Runs a crawl and returns the full report.
pub async fn crawl_report(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<CrawlRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let report = run_crawl(&state, body).await?;
    Ok(axum::Json(report))
}

async fn run_crawl(state: &AppState, body: CrawlRequest) -> Result<CrawlReport, ApiError> {
    body.validate().map_err(ApiError::BadRequest)?;

    let output = state.config.output_path(Some(&body.output_filename));
    let sink = Arc::new(ResultSink::json_file(output));
    let options = body.options(state.config.crawler.max_pages);

    // Server shutdown cancels every crawl still running
    let cancel = state.shutdown.child_token();

    tracing::info!(seeds = body.urls.len(), output = %sink.target(), "Crawl requested");
    let report = state
        .coordinator
        .crawl(&body.urls, &options, sink, cancel)
        .await?;
    log_report(&report);

    Ok(report)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

pub async fn health() -> impl IntoResponse {
    axum::Json(HealthResponse { status: "ok" })
}
