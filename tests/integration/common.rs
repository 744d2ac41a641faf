//! Shared fixtures for the integration tests

use async_trait::async_trait;
use product_scout::config::{Config, PatternEntry};
use product_scout::crawler::{LinkTier, TierOutcome};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

/// Product pattern registered for the mock servers' host
pub const PRODUCT_PATTERN: &str = r"^/products/[\w-]+-\d+$";

/// Config for crawling wiremock servers: HTTP tier only, fast retries
pub fn test_config(output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = 2;
    config.crawler.concurrency = 4;
    config.crawler.max_retries = 3;
    config.crawler.initial_backoff_ms = 10;
    config.fetch.timeout_secs = 5;
    config.fetch.connect_timeout_secs = 2;
    config.render.session_enabled = false;
    config.render.browser_enabled = false;
    config.output.output_dir = output_dir.display().to_string();
    config.patterns = vec![PatternEntry {
        host: "127.0.0.1".to_string(),
        pattern: PRODUCT_PATTERN.to_string(),
        match_query: false,
    }];
    config
}

/// HTML page with one anchor per href
pub fn html_page(hrefs: &[String]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{href}">link</a>"#))
        .collect();
    format!("<html><head><title>Page</title></head><body>{anchors}</body></html>")
}

/// Tier returning a fixed outcome and counting its calls
pub struct CountingTier {
    name: &'static str,
    links: Vec<String>,
    calls: Arc<AtomicUsize>,
}

impl CountingTier {
    pub fn new(name: &'static str, links: Vec<String>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name,
                links,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl LinkTier for CountingTier {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn discover(&self, _url: &Url) -> TierOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        TierOutcome::from_links(self.links.iter().cloned().collect::<BTreeSet<_>>())
    }
}
