use crate::config::types::{Config, CrawlerConfig, FetchConfig, OutputConfig, PatternEntry, RenderConfig};
use crate::url::ensure_scheme;
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Upper bound on in-flight pages per seed
pub const MAX_CONCURRENCY: u32 = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_render_config(&config.render)?;
    validate_output_config(&config.output)?;
    validate_patterns(&config.patterns)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(
            "max_retries must be >= 1".to_string(),
        ));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    for seed in &config.seeds {
        validate_seed(seed)?;
    }

    Ok(())
}

/// Validates a seed URL after applying the default scheme
pub fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    let url = Url::parse(&ensure_scheme(seed))
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(())
}

/// Validates HTTP tier configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 || config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetch timeouts must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

/// Validates rendering tier configuration
fn validate_render_config(config: &RenderConfig) -> Result<(), ConfigError> {
    if config.page_timeout_secs == 0 || config.root_wait_secs == 0 {
        return Err(ConfigError::Validation(
            "render timeouts must be greater than zero".to_string(),
        ));
    }

    if config.max_scroll_attempts < 1 {
        return Err(ConfigError::Validation(
            "max_scroll_attempts must be >= 1".to_string(),
        ));
    }

    if config.stable_height_checks < 1 {
        return Err(ConfigError::Validation(
            "stable_height_checks must be >= 1".to_string(),
        ));
    }

    if config.root_selector.trim().is_empty() {
        return Err(ConfigError::Validation(
            "root_selector cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.output_dir.is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    validate_output_filename(&config.default_filename)
}

/// Validates that a snapshot file name is a bare file name inside the output directory
pub fn validate_output_filename(name: &str) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output filename cannot be empty".to_string(),
        ));
    }

    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(ConfigError::Validation(format!(
            "output filename '{}' must not contain path separators",
            name
        )));
    }

    Ok(())
}

/// Validates extra product pattern entries
fn validate_patterns(patterns: &[PatternEntry]) -> Result<(), ConfigError> {
    for entry in patterns {
        validate_host(&entry.host)?;

        Regex::new(&entry.pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!(
                "Pattern for '{}' does not compile: {}",
                entry.host, e
            ))
        })?;
    }

    Ok(())
}

/// Validates an exact hostname used as a classifier key
fn validate_host(host: &str) -> Result<(), ConfigError> {
    if host.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Pattern host cannot be empty".to_string(),
        ));
    }

    if host.starts_with("*.") {
        return Err(ConfigError::InvalidPattern(format!(
            "Pattern host '{}' must be an exact hostname, wildcards are not supported",
            host
        )));
    }

    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Pattern host '{}' contains invalid characters",
            host
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Pattern host '{}' is malformed",
            host
        )));
    }

    Ok(())
}
