//! Crawler coordinator - runs one scheduler per seed
//!
//! This module handles:
//! - Normalizing seeds and building their schedulers
//! - Running every scheduler concurrently against a shared result sink
//! - Final persistence of the union, also when a scheduler fails
//! - Assembling the crawl report

use crate::classifier::ProductClassifier;
use crate::config::Config;
use crate::crawler::scheduler::{CrawlOptions, Scheduler};
use crate::crawler::tiers::TierChain;
use crate::output::{CrawlReport, ResultSink};
use crate::url::ensure_scheme;
use crate::ScoutError;
use chrono::Utc;
use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Shared, reusable crawl machinery: the tier chain and the classifier
///
/// One coordinator can serve many crawls (the API server keeps a single one).
/// Per-crawl state lives in the schedulers it creates.
#[derive(Clone)]
pub struct Coordinator {
    tiers: Arc<TierChain>,
    classifier: Arc<ProductClassifier>,
}

impl Coordinator {
    pub fn new(tiers: TierChain, classifier: ProductClassifier) -> Self {
        Self {
            tiers: Arc::new(tiers),
            classifier: Arc::new(classifier),
        }
    }

    /// Builds the production tier chain and the classifier (built-in table plus
    /// configured `[[pattern]]` entries)
    pub fn from_config(config: &Config) -> Result<Self, ScoutError> {
        let tiers = TierChain::from_config(config)?;
        let classifier = ProductClassifier::from_entries(&config.patterns)?;
        Ok(Self::new(tiers, classifier))
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.names()
    }

    pub fn classifier(&self) -> &ProductClassifier {
        &self.classifier
    }

    /// Crawls every seed and returns the union of their product URLs
    ///
    /// Seeds without a scheme get `https://`. Each seed gets its own scheduler,
    /// frontier and concurrency limit; two seeds on the same host are still
    /// crawled independently.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - All schedulers finished; the union was flushed
    /// * `Err(ScoutError::Cancelled)` - `cancel` fired; partial results were flushed
    /// * `Err(ScoutError)` - A seed was invalid, or a scheduler failed (partial
    ///   results were flushed)
    pub async fn crawl(
        &self,
        seeds: &[String],
        options: &CrawlOptions,
        sink: Arc<ResultSink>,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, ScoutError> {
        let started_at = Utc::now();

        let mut schedulers = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let url = Url::parse(&ensure_scheme(seed))?;
            schedulers.push(Scheduler::new(
                url,
                *options,
                self.tiers.clone(),
                self.classifier.clone(),
                sink.clone(),
            )?);
        }

        tracing::info!(
            seeds = schedulers.len(),
            max_depth = options.max_depth,
            concurrency = options.concurrency,
            output = %sink.target(),
            "Crawl started"
        );

        let results = join_all(
            schedulers
                .into_iter()
                .map(|scheduler| scheduler.run(cancel.clone())),
        )
        .await;

        let mut products = BTreeSet::new();
        let mut reports = Vec::new();
        let mut failure = None;

        for result in results {
            match result {
                Ok(outcome) => {
                    products.extend(outcome.products);
                    reports.push(outcome.report);
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    tracing::error!(error = %e, "Seed crawl failed");
                    if failure.is_none() {
                        failure = Some(e);
                    }
                }
            }
        }

        if cancel.is_cancelled() || failure.is_some() {
            if let Err(e) = sink.flush().await {
                tracing::error!(error = %e, "Failed to persist partial results");
            }
            let discovered = sink.len().await;

            return Err(match failure {
                Some(e) if !cancel.is_cancelled() => e,
                _ => {
                    tracing::warn!(discovered, "Crawl cancelled");
                    ScoutError::Cancelled { discovered }
                }
            });
        }

        sink.flush().await?;

        Ok(CrawlReport {
            products: products.into_iter().collect(),
            seeds: reports,
            started_at,
            finished_at: Utc::now(),
        })
    }
}
