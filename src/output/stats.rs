//! Crawl reports
//!
//! Per-seed counters collected by the schedulers and the aggregate report
//! returned by the coordinator.

use crate::state::SchedulerState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Counters for one seed's crawl
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    /// The seed after scheme normalization
    pub seed: String,

    /// Final scheduler state
    pub state: SchedulerState,

    /// Distinct URLs dequeued and processed
    pub pages_visited: u64,

    /// Pages for which every tier failed or came back empty
    pub pages_failed: u64,

    /// Product URLs found from this seed
    pub products: u64,

    /// Links found, keyed by the tier that found them
    pub links_by_tier: BTreeMap<String, u64>,
}

impl SeedReport {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            ..Self::default()
        }
    }

    /// Records a page whose links came from `tier`
    pub fn record_links(&mut self, tier: &str, count: usize) {
        *self.links_by_tier.entry(tier.to_string()).or_insert(0) += count as u64;
    }

    /// Total links found across tiers
    pub fn total_links(&self) -> u64 {
        self.links_by_tier.values().sum()
    }
}

/// Result of a whole crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    /// Sorted, deduplicated union of every seed's product URLs
    pub products: Vec<String>,

    pub seeds: Vec<SeedReport>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    pub fn pages_visited(&self) -> u64 {
        self.seeds.iter().map(|s| s.pages_visited).sum()
    }

    pub fn pages_failed(&self) -> u64 {
        self.seeds.iter().map(|s| s.pages_failed).sum()
    }
}

/// Logs a one-line summary per seed plus a total line
pub fn log_report(report: &CrawlReport) {
    for seed in &report.seeds {
        tracing::info!(
            seed = %seed.seed,
            state = %seed.state,
            visited = seed.pages_visited,
            failed = seed.pages_failed,
            products = seed.products,
            links = seed.total_links(),
            "Seed finished"
        );
    }

    tracing::info!(
        products = report.products.len(),
        visited = report.pages_visited(),
        failed = report.pages_failed(),
        duration_secs = report.duration_seconds(),
        "Crawl finished"
    );
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Overview:");
    println!("  Product URLs: {}", report.products.len());
    println!("  Pages visited: {}", report.pages_visited());
    println!("  Pages without links: {}", report.pages_failed());
    println!("  Duration: {}s", report.duration_seconds());
    println!();

    for seed in &report.seeds {
        println!("Seed {} ({}):", seed.seed, seed.state);
        println!(
            "  visited {}, failed {}, products {}",
            seed.pages_visited, seed.pages_failed, seed.products
        );
        for (tier, links) in &seed.links_by_tier {
            println!("  {}: {} links", tier, links);
        }
        println!();
    }
}
