//! Crawler module: fetching, link discovery and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded retries
//! - An escalating chain of fetch tiers (HTTP, then headless rendering)
//! - HTML link extraction
//! - The per-seed frontier and scheduler
//! - Multi-seed coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
#[cfg(feature = "browser")]
mod render;
mod retry;
mod scheduler;
mod tiers;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, fetch_page, FetchError};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::extract_links;
#[cfg(feature = "browser")]
pub use render::{BrowserHandle, BrowserTier, SessionTier};
pub use retry::{fetch_with_retry, RetryPolicy};
pub use scheduler::{CrawlOptions, Scheduler, SeedOutcome};
pub use tiers::{Discovery, HttpTier, LinkTier, TierChain, TierOutcome};

use crate::config::Config;
use crate::output::{CrawlReport, ResultSink};
use crate::ScoutError;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl from configuration
///
/// This is the main entry point for a one-shot crawl. It will:
/// 1. Build the tier chain and the classifier from `config`
/// 2. Crawl every seed with the `[crawler]` limits
/// 3. Write snapshots to `output` as products are found
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `seeds` - Seed URLs, with or without scheme
/// * `output` - Snapshot file path
/// * `cancel` - Cancels the crawl; partial results are still written
pub async fn crawl(
    config: &Config,
    seeds: &[String],
    output: impl Into<PathBuf>,
    cancel: CancellationToken,
) -> Result<CrawlReport, ScoutError> {
    let coordinator = Coordinator::from_config(config)?;
    let sink = Arc::new(ResultSink::json_file(output));
    let options = CrawlOptions::from_config(&config.crawler);

    coordinator.crawl(seeds, &options, sink, cancel).await
}
