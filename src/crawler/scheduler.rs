//! Per-seed frontier scheduler
//!
//! This module handles:
//! - Dequeuing frontier entries in priority order and marking them visited
//! - Bounding in-flight page tasks with a semaphore
//! - Classifying discovered links into products and internal links
//! - Persisting new products as soon as a page completes
//!
//! All mutable crawl state (frontier, visited set, product set) lives in the
//! scheduler and is only touched from its result-collection loop. Page tasks
//! receive an owned URL and hand back a [`Discovery`]; they never see the state.

use crate::classifier::ProductClassifier;
use crate::config::CrawlerConfig;
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::tiers::{Discovery, TierChain};
use crate::output::{ResultSink, SeedReport};
use crate::state::SchedulerState;
use crate::url::{extract_domain, is_same_domain};
use crate::{ScoutError, UrlError};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Limits applied to every seed of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Link hops followed from the seed; entries at this depth are fetched but
    /// their internal links are not queued
    pub max_depth: u32,

    /// In-flight pages per seed
    pub concurrency: usize,

    /// Cap on distinct URLs dequeued per seed
    pub max_pages: Option<usize>,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_depth: 2,
            concurrency: 10,
            max_pages: None,
        }
    }
}

impl CrawlOptions {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            concurrency: config.concurrency as usize,
            max_pages: config.max_pages,
        }
    }
}

/// What a finished seed crawl hands back to the coordinator
#[derive(Debug, Clone)]
pub struct SeedOutcome {
    pub products: BTreeSet<String>,
    pub report: SeedReport,
}

/// Output of one page task
struct PageResult {
    entry: FrontierEntry,
    discovery: Discovery,
}

/// Crawls everything reachable from one seed inside the seed's domain
pub struct Scheduler {
    seed: Url,
    base_domain: String,
    options: CrawlOptions,
    frontier: Frontier,
    products: BTreeSet<String>,
    state: SchedulerState,
    semaphore: Arc<Semaphore>,
    tiers: Arc<TierChain>,
    classifier: Arc<ProductClassifier>,
    sink: Arc<ResultSink>,
    report: SeedReport,
}

impl Scheduler {
    /// Creates a scheduler with the seed queued at depth 0
    ///
    /// # Returns
    ///
    /// * `Ok(Scheduler)` - Ready to run
    /// * `Err(ScoutError)` - The seed has no host to bound the crawl by
    pub fn new(
        seed: Url,
        options: CrawlOptions,
        tiers: Arc<TierChain>,
        classifier: Arc<ProductClassifier>,
        sink: Arc<ResultSink>,
    ) -> Result<Self, ScoutError> {
        let base_domain = extract_domain(&seed).ok_or(UrlError::MissingDomain)?;

        let mut frontier = Frontier::new(options.max_depth);
        frontier.push(seed.clone(), 0, classifier.looks_like_product(&seed));

        Ok(Self {
            report: SeedReport::new(seed.as_str()),
            seed,
            base_domain,
            options,
            frontier,
            products: BTreeSet::new(),
            state: SchedulerState::Idle,
            semaphore: Arc::new(Semaphore::new(options.concurrency.max(1))),
            tiers,
            classifier,
            sink,
        })
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn base_domain(&self) -> &str {
        &self.base_domain
    }

    /// Runs the crawl to completion
    ///
    /// # Returns
    ///
    /// * `Ok(SeedOutcome)` - Frontier exhausted or page budget reached
    /// * `Err(ScoutError::Cancelled)` - `cancel` fired; in-flight pages were
    ///   awaited and everything found was persisted first
    /// * `Err(ScoutError::Scheduler)` - A snapshot could not be written, or the
    ///   scheduler hit an illegal state change
    pub async fn run(self, cancel: CancellationToken) -> Result<SeedOutcome, ScoutError> {
        let seed = self.seed.to_string();
        self.drive(cancel).await.map_err(|e| match e {
            ScoutError::Cancelled { .. } => e,
            other => ScoutError::Scheduler {
                seed,
                message: other.to_string(),
            },
        })
    }

    async fn drive(mut self, cancel: CancellationToken) -> Result<SeedOutcome, ScoutError> {
        self.state.transition(SchedulerState::Running)?;
        tracing::info!(
            seed = %self.seed,
            domain = %self.base_domain,
            max_depth = self.options.max_depth,
            concurrency = self.options.concurrency,
            "Seed crawl started"
        );

        let mut in_flight: JoinSet<PageResult> = JoinSet::new();

        loop {
            if cancel.is_cancelled() {
                return self.finish_cancelled(in_flight).await;
            }

            if self.state.accepts_work() {
                self.dispatch(&mut in_flight);

                if self.budget_exhausted() {
                    tracing::info!(seed = %self.seed, visited = self.frontier.visited_count(), "Page budget reached");
                    self.state.transition(SchedulerState::Draining)?;
                } else if self.frontier.is_empty() && in_flight.is_empty() {
                    self.state.transition(SchedulerState::Draining)?;
                }
            }

            if in_flight.is_empty() {
                break;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {}
                Some(joined) = in_flight.join_next() => self.absorb(joined).await?,
            }
        }

        self.state.transition(SchedulerState::Done)?;
        Ok(self.into_outcome())
    }

    /// Starts page tasks until the frontier, the semaphore or the page budget runs out
    fn dispatch(&mut self, in_flight: &mut JoinSet<PageResult>) {
        while !self.budget_exhausted() {
            let permit = match self.semaphore.clone().try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let Some(entry) = self.frontier.pop_unvisited() else {
                break;
            };

            tracing::debug!(url = %entry.url, depth = entry.depth, likely_product = entry.likely_product, "Dispatching");

            let tiers = self.tiers.clone();
            in_flight.spawn(async move {
                let _permit = permit;
                let discovery = tiers.discover(&entry.url).await;
                PageResult { entry, discovery }
            });
        }
    }

    /// Folds a finished page into the scheduler state
    async fn absorb(&mut self, joined: Result<PageResult, JoinError>) -> Result<(), ScoutError> {
        let PageResult { entry, discovery } = match joined {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(seed = %self.seed, error = %e, "Page task panicked");
                self.report.pages_failed += 1;
                return Ok(());
            }
        };

        let Some(tier) = discovery.tier else {
            tracing::debug!(url = %entry.url, "No links from any tier");
            self.report.pages_failed += 1;
            return Ok(());
        };
        self.report.record_links(tier, discovery.links.len());

        let follow = self.state.accepts_work() && entry.depth < self.options.max_depth;
        let mut new_products = Vec::new();
        let mut queued = 0usize;

        for link in discovery.links {
            let Ok(url) = Url::parse(&link) else {
                continue;
            };

            if self.classifier.is_product_url(&url) {
                if self.products.insert(link.clone()) {
                    new_products.push(link);
                }
            } else if follow && is_same_domain(&url, &self.base_domain) {
                let likely = self.classifier.looks_like_product(&url);
                if self.frontier.push(url, entry.depth + 1, likely) {
                    queued += 1;
                }
            }
        }

        tracing::debug!(
            url = %entry.url,
            tier,
            products = new_products.len(),
            queued,
            "Page processed"
        );

        if !new_products.is_empty() {
            tracing::info!(seed = %self.seed, new = new_products.len(), total = self.products.len(), "Product URLs found");
            self.sink.persist(new_products).await?;
        }

        Ok(())
    }

    async fn finish_cancelled(
        mut self,
        mut in_flight: JoinSet<PageResult>,
    ) -> Result<SeedOutcome, ScoutError> {
        tracing::warn!(seed = %self.seed, in_flight = in_flight.len(), "Cancelled, waiting for in-flight pages");
        self.state.transition(SchedulerState::Done)?;

        // absorb persists whatever the drained pages add
        while let Some(joined) = in_flight.join_next().await {
            self.absorb(joined).await?;
        }

        Err(ScoutError::Cancelled {
            discovered: self.products.len(),
        })
    }

    fn budget_exhausted(&self) -> bool {
        self.options
            .max_pages
            .is_some_and(|max| self.frontier.visited_count() >= max)
    }

    fn into_outcome(mut self) -> SeedOutcome {
        self.report.state = self.state;
        self.report.pages_visited = self.frontier.visited_count() as u64;
        self.report.products = self.products.len() as u64;

        tracing::info!(
            seed = %self.seed,
            visited = self.report.pages_visited,
            failed = self.report.pages_failed,
            products = self.report.products,
            "Seed crawl finished"
        );

        SeedOutcome {
            products: self.products,
            report: self.report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::tiers::{LinkTier, TierOutcome};
    use crate::output::MemoryWriter;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const ORIGIN: &str = "https://shop.test";

    /// In-memory site: path -> outgoing links. Relative links are made absolute.
    struct SiteTier {
        pages: HashMap<String, Vec<String>>,
        fetched: Arc<Mutex<Vec<String>>>,
    }

    impl SiteTier {
        fn new(pages: &[(&str, &[&str])]) -> (Self, Arc<Mutex<Vec<String>>>) {
            let fetched = Arc::new(Mutex::new(Vec::new()));
            let pages = pages
                .iter()
                .map(|(path, links)| {
                    let links = links
                        .iter()
                        .map(|l| {
                            if l.starts_with('/') {
                                format!("{ORIGIN}{l}")
                            } else {
                                l.to_string()
                            }
                        })
                        .collect();
                    (path.to_string(), links)
                })
                .collect();
            (
                Self {
                    pages,
                    fetched: fetched.clone(),
                },
                fetched,
            )
        }
    }

    #[async_trait]
    impl LinkTier for SiteTier {
        fn name(&self) -> &'static str {
            "site"
        }

        async fn discover(&self, url: &Url) -> TierOutcome {
            self.fetched.lock().unwrap().push(url.path().to_string());
            match self.pages.get(url.path()) {
                Some(links) => TierOutcome::from_links(links.iter().cloned().collect()),
                None => TierOutcome::Empty,
            }
        }
    }

    fn classifier() -> Arc<ProductClassifier> {
        Arc::new(
            ProductClassifier::new()
                .with_pattern("shop.test", r"^/products/[\w-]+-\d+$", false)
                .unwrap(),
        )
    }

    fn scheduler(tier: SiteTier, options: CrawlOptions) -> (Scheduler, MemoryWriter) {
        let writer = MemoryWriter::new();
        let sink = Arc::new(ResultSink::new(Arc::new(writer.clone())));
        let scheduler = Scheduler::new(
            Url::parse(&format!("{ORIGIN}/")).unwrap(),
            options,
            Arc::new(TierChain::new().with_tier(tier)),
            classifier(),
            sink,
        )
        .unwrap();
        (scheduler, writer)
    }

    fn options(max_depth: u32, concurrency: usize) -> CrawlOptions {
        CrawlOptions {
            max_depth,
            concurrency,
            max_pages: None,
        }
    }

    fn fetched(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_products_collected_and_not_fetched() {
        let (tier, log) = SiteTier::new(&[("/", &["/products/shoe-123", "/about"])]);
        let (scheduler, writer) = scheduler(tier, options(1, 4));

        let outcome = scheduler.run(CancellationToken::new()).await.unwrap();

        assert_eq!(
            outcome.products.into_iter().collect::<Vec<_>>(),
            vec![format!("{ORIGIN}/products/shoe-123")]
        );
        let mut fetched = fetched(&log);
        fetched.sort();
        assert_eq!(fetched, vec!["/", "/about"]);
        assert_eq!(writer.write_count(), 1);
        assert_eq!(outcome.report.state, SchedulerState::Done);
        assert_eq!(outcome.report.pages_visited, 2);
        // /about yields nothing from the only tier
        assert_eq!(outcome.report.pages_failed, 1);
    }

    #[tokio::test]
    async fn test_each_url_fetched_at_most_once() {
        let (tier, log) = SiteTier::new(&[
            ("/", &["/a", "/b", "/a/"]),
            ("/a", &["/", "/b", "/a?ref=loop"]),
            ("/b", &["/a", "/"]),
        ]);
        let (scheduler, _) = scheduler(tier, options(5, 3));

        scheduler.run(CancellationToken::new()).await.unwrap();

        let mut fetched = fetched(&log);
        fetched.sort();
        assert_eq!(fetched, vec!["/", "/a", "/b"]);
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let (tier, log) = SiteTier::new(&[
            ("/", &["/l1"]),
            ("/l1", &["/l2"]),
            ("/l2", &["/l3"]),
            ("/l3", &["/products/deep-1"]),
        ]);
        let (scheduler, _) = scheduler(tier, options(2, 1));

        let outcome = scheduler.run(CancellationToken::new()).await.unwrap();

        assert_eq!(fetched(&log), vec!["/", "/l1", "/l2"]);
        assert!(outcome.products.is_empty());
    }

    #[tokio::test]
    async fn test_depth_zero_fetches_only_seed() {
        let (tier, log) = SiteTier::new(&[("/", &["/products/top-1", "/category"])]);
        let (scheduler, _) = scheduler(tier, options(0, 2));

        let outcome = scheduler.run(CancellationToken::new()).await.unwrap();

        assert_eq!(fetched(&log), vec!["/"]);
        assert_eq!(outcome.products.len(), 1);
    }

    #[tokio::test]
    async fn test_external_links_not_followed() {
        let (tier, log) = SiteTier::new(&[(
            "/",
            &[
                "https://other.test/page",
                "https://sub.shop.test/page",
                "http://shop.test:8080/page",
                "/inside",
            ],
        )]);
        let (scheduler, _) = scheduler(tier, options(2, 2));

        scheduler.run(CancellationToken::new()).await.unwrap();

        let mut fetched = fetched(&log);
        fetched.sort();
        assert_eq!(fetched, vec!["/", "/inside"]);
    }

    #[tokio::test]
    async fn test_product_like_links_dispatched_first() {
        let (tier, log) = SiteTier::new(&[("/", &["/about", "/item/blue-shirt", "/contact"])]);
        let (scheduler, _) = scheduler(tier, options(1, 1));

        scheduler.run(CancellationToken::new()).await.unwrap();

        assert_eq!(fetched(&log), vec!["/", "/item/blue-shirt", "/about", "/contact"]);
    }

    #[tokio::test]
    async fn test_page_budget() {
        let (tier, log) = SiteTier::new(&[("/", &["/a", "/b", "/c", "/d"])]);
        let (scheduler, _) = scheduler(
            tier,
            CrawlOptions {
                max_depth: 2,
                concurrency: 1,
                max_pages: Some(3),
            },
        );

        let outcome = scheduler.run(CancellationToken::new()).await.unwrap();

        assert_eq!(fetched(&log).len(), 3);
        assert_eq!(outcome.report.pages_visited, 3);
    }

    #[tokio::test]
    async fn test_products_persisted_incrementally() {
        let (tier, _) = SiteTier::new(&[
            ("/", &["/products/a-1", "/list"]),
            ("/list", &["/products/a-1", "/products/b-2"]),
        ]);
        let (scheduler, writer) = scheduler(tier, options(2, 1));

        scheduler.run(CancellationToken::new()).await.unwrap();

        assert_eq!(
            writer.snapshots(),
            vec![
                vec![format!("{ORIGIN}/products/a-1")],
                vec![
                    format!("{ORIGIN}/products/a-1"),
                    format!("{ORIGIN}/products/b-2")
                ],
            ]
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (tier, log) = SiteTier::new(&[("/", &["/products/a-1"])]);
        let (scheduler, _) = scheduler(tier, options(2, 1));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = scheduler.run(cancel).await;

        assert!(matches!(result, Err(ScoutError::Cancelled { discovered: 0 })));
        assert!(fetched(&log).is_empty());
    }

    #[tokio::test]
    async fn test_links_counted_by_tier() {
        let (tier, _) = SiteTier::new(&[("/", &["/a", "/b"]), ("/a", &["/"])]);
        let (scheduler, _) = scheduler(tier, options(1, 2));

        let outcome = scheduler.run(CancellationToken::new()).await.unwrap();

        assert_eq!(outcome.report.links_by_tier["site"], 3);
    }

    struct BrokenWriter;

    #[async_trait]
    impl crate::output::SnapshotWriter for BrokenWriter {
        async fn write_snapshot(&self, _urls: &[String]) -> crate::output::SinkResult<()> {
            Err(crate::output::SinkError::Io {
                path: "broken.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            })
        }

        fn target(&self) -> String {
            "broken.json".to_string()
        }
    }

    #[tokio::test]
    async fn test_sink_failure_is_scheduler_fatal() {
        let (tier, _) = SiteTier::new(&[("/", &["/products/a-1"])]);
        let scheduler = Scheduler::new(
            Url::parse(&format!("{ORIGIN}/")).unwrap(),
            options(2, 1),
            Arc::new(TierChain::new().with_tier(tier)),
            classifier(),
            Arc::new(ResultSink::new(Arc::new(BrokenWriter))),
        )
        .unwrap();

        let result = scheduler.run(CancellationToken::new()).await;

        match result {
            Err(ScoutError::Scheduler { seed, message }) => {
                assert_eq!(seed, format!("{ORIGIN}/"));
                assert!(message.contains("disk full"));
            }
            other => panic!("expected scheduler failure, got {other:?}"),
        }
    }

    #[test]
    fn test_seed_without_host_rejected() {
        let (tier, _) = SiteTier::new(&[]);
        let sink = Arc::new(ResultSink::new(Arc::new(MemoryWriter::new())));
        let result = Scheduler::new(
            Url::parse("file:///tmp/index.html").unwrap(),
            CrawlOptions::default(),
            Arc::new(TierChain::new().with_tier(tier)),
            classifier(),
            sink,
        );
        assert!(matches!(result, Err(ScoutError::UrlError(UrlError::MissingDomain))));
    }
}
