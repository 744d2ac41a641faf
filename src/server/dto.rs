use serde::{Deserialize, Serialize};

use crate::config::{validate_output_filename, validate_seed, MAX_CONCURRENCY};
use crate::crawler::CrawlOptions;

// ---------------------------------------------------------------------------
// Crawl
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CrawlRequest {
    pub urls: Vec<String>,
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_output_filename")]
    pub output_filename: String,
}

impl CrawlRequest {
    /// Checks what the crawler assumes of its caller
    pub fn validate(&self) -> Result<(), String> {
        if self.urls.is_empty() {
            return Err("urls must contain at least one seed".to_string());
        }
        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY as usize {
            return Err(format!(
                "concurrency must be between 1 and {}, got {}",
                MAX_CONCURRENCY, self.concurrency
            ));
        }
        for url in &self.urls {
            validate_seed(url).map_err(|e| e.to_string())?;
        }
        validate_output_filename(&self.output_filename).map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Crawl limits for this request; the page budget comes from server config
    pub fn options(&self, max_pages: Option<usize>) -> CrawlOptions {
        CrawlOptions {
            max_depth: self.max_depth,
            concurrency: self.concurrency,
            max_pages,
        }
    }
}

fn default_max_depth() -> u32 {
    2
}

fn default_concurrency() -> usize {
    10
}

fn default_output_filename() -> String {
    "products.json".to_string()
}

// ---------------------------------------------------------------------------
// Common
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
