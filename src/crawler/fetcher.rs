//! HTTP fetcher implementation
//!
//! This module is the lightweight transport behind the first fetch tier:
//! - Building an HTTP client with a browser User-Agent and browser-like headers
//! - GET requests with finite total and connect timeouts
//! - Classifying failures so the retry layer can log them

use crate::config::FetchConfig;
use crate::ScoutError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Transport failure for a single GET
///
/// Every variant is transient from the crawler's point of view: it is retried
/// and, once retries are exhausted, the URL escalates to the next tier.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Failed to read response body from {url}: {message}")]
    Body { url: String, message: String },

    #[error("Empty response body from {url}")]
    EmptyBody { url: String },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch tier configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(ScoutError)` - A header value was invalid or the client failed to build
///
/// # Example
///
/// ```no_run
/// use product_scout::config::FetchConfig;
/// use product_scout::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, ScoutError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_str(&config.accept)?);
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_str(&config.accept_language)?);
    headers.insert(REFERER, HeaderValue::from_str(&config.referer)?);

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Fetches a page body
///
/// # Failure Rules
///
/// | Condition | Result |
/// |-----------|--------|
/// | Status other than 200 | `FetchError::Status` |
/// | Total or connect timeout | `FetchError::Timeout` |
/// | Connection refused / DNS / TLS | `FetchError::Connect` |
/// | Body could not be decoded | `FetchError::Body` |
/// | Body is empty or whitespace | `FetchError::EmptyBody` |
///
/// Redirects are followed by the client.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await.map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Body {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    })?;

    if body.trim().is_empty() {
        return Err(FetchError::EmptyBody {
            url: url.to_string(),
        });
    }

    Ok(body)
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
