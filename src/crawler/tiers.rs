//! Escalating fetch tiers
//!
//! Each tier turns a URL into a set of absolute links. The chain calls the tiers
//! in order of cost and stops at the first one that yields at least one link:
//!
//! | Tier | Strategy | Retries |
//! |------|----------|---------|
//! | `http` | Plain GET + HTML link extraction | Yes, exponential backoff |
//! | `session` | Rendered DOM in a headless tab | No |
//! | `browser` | Rendered, scrolled, filtered anchors | No |
//!
//! Escalation is driven by the link count, not by the transport result: a page
//! that loads fine but has no anchors still escalates.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::parser::extract_links;
use crate::crawler::retry::{fetch_with_retry, RetryPolicy};
use crate::ScoutError;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeSet;
use std::sync::Arc;
use url::Url;

/// Result of a single tier for a single URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierOutcome {
    /// At least one link was found
    Links(BTreeSet<String>),

    /// The tier worked but the page yielded no links
    Empty,

    /// The tier could not produce a page (transport, rendering, timeout)
    Failed(String),
}

impl TierOutcome {
    /// Wraps a link set, mapping an empty set to [`TierOutcome::Empty`]
    pub fn from_links(links: BTreeSet<String>) -> Self {
        if links.is_empty() {
            Self::Empty
        } else {
            Self::Links(links)
        }
    }
}

/// One page-retrieval strategy in the escalation chain
#[async_trait]
pub trait LinkTier: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &'static str;

    /// Retrieves `url` and returns the links found on it
    ///
    /// Implementations must not panic or return early errors: every failure is
    /// reported as [`TierOutcome::Failed`].
    async fn discover(&self, url: &Url) -> TierOutcome;
}

/// Lightweight HTTP tier with bounded retries
#[derive(Clone)]
pub struct HttpTier {
    client: Client,
    retry: RetryPolicy,
}

impl HttpTier {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }
}

#[async_trait]
impl LinkTier for HttpTier {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn discover(&self, url: &Url) -> TierOutcome {
        let url_str = url.as_str();
        let body =
            fetch_with_retry(&self.retry, url_str, || fetch_page(&self.client, url_str)).await;

        match body {
            Some(html) => TierOutcome::from_links(extract_links(&html, url)),
            None => TierOutcome::Failed(format!(
                "no content after {} attempts",
                self.retry.max_attempts
            )),
        }
    }
}

/// Links found for one URL and the tier that found them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub links: BTreeSet<String>,

    /// `None` when every tier came back empty or failed
    pub tier: Option<&'static str>,
}

/// Ordered list of tiers, cheapest first
#[derive(Clone, Default)]
pub struct TierChain {
    tiers: Vec<Arc<dyn LinkTier>>,
}

impl TierChain {
    /// Creates an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tier to the end of the chain
    pub fn with_tier(mut self, tier: impl LinkTier + 'static) -> Self {
        self.tiers.push(Arc::new(tier));
        self
    }

    /// Builds the production chain from configuration
    ///
    /// The HTTP tier is always present. The rendering tiers are added when the
    /// `browser` feature is compiled in and enabled in `[render]`; they share one
    /// lazily launched Chromium process.
    pub fn from_config(config: &Config) -> Result<Self, ScoutError> {
        let client = build_http_client(&config.fetch)?;
        let chain = Self::new().with_tier(HttpTier::new(
            client,
            RetryPolicy::from_config(&config.crawler),
        ));

        #[cfg(feature = "browser")]
        let chain = {
            use crate::crawler::render::{BrowserHandle, BrowserTier, SessionTier};

            let mut chain = chain;
            let render = &config.render;
            if render.session_enabled || render.browser_enabled {
                let handle = BrowserHandle::new();
                if render.session_enabled {
                    chain = chain.with_tier(SessionTier::new(handle.clone(), render));
                }
                if render.browser_enabled {
                    chain = chain.with_tier(BrowserTier::new(handle, render));
                }
            }
            chain
        };

        Ok(chain)
    }

    /// Tier names in escalation order
    pub fn names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|tier| tier.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Walks the chain until a tier yields links
    ///
    /// An empty [`Discovery`] is a valid terminal outcome, not an error.
    pub async fn discover(&self, url: &Url) -> Discovery {
        for tier in &self.tiers {
            match tier.discover(url).await {
                TierOutcome::Links(links) if !links.is_empty() => {
                    tracing::debug!(url = %url, tier = tier.name(), links = links.len(), "Links found");
                    return Discovery {
                        links,
                        tier: Some(tier.name()),
                    };
                }
                TierOutcome::Links(_) | TierOutcome::Empty => {
                    tracing::debug!(url = %url, tier = tier.name(), "No links, escalating");
                }
                TierOutcome::Failed(reason) => {
                    tracing::warn!(url = %url, tier = tier.name(), %reason, "Tier failed, escalating");
                }
            }
        }

        tracing::debug!(url = %url, "All tiers exhausted without links");
        Discovery::default()
    }
}
