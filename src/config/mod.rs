//! Configuration module for Product-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing keys fall back to the defaults in [`types`].
//!
//! # Example
//!
//! ```no_run
//! use product_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scout.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

use std::path::PathBuf;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetchConfig, OutputConfig, PatternEntry, RenderConfig, ServerConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_output_filename, validate_seed, MAX_CONCURRENCY};

impl Config {
    /// Resolves the snapshot file for a crawl inside the configured output directory
    ///
    /// Falls back to `output.default-filename` when no name is given.
    pub fn output_path(&self, filename: Option<&str>) -> PathBuf {
        let name = filename.unwrap_or(&self.output.default_filename);
        PathBuf::from(&self.output.output_dir).join(name)
    }
}
