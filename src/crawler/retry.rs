//! Bounded retries with exponential backoff for the first fetch tier

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::FetchError;
use std::future::Future;
use std::time::Duration;

/// Retry settings for a single URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Sleep after the first failure; doubled after every further failure
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.initial_backoff_ms),
        )
    }

    /// Backoff slept after the given failed attempt (1-based)
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Runs `attempt` until it succeeds or the policy is exhausted
///
/// After a failed attempt the task sleeps for the current backoff and doubles it.
/// No sleep follows the final attempt. Failures are logged, never returned: a
/// `None` only tells the caller that this URL produced nothing on this tier.
///
/// # Example
///
/// ```no_run
/// use product_scout::crawler::{fetch_page, fetch_with_retry, RetryPolicy};
///
/// # async fn example(client: reqwest::Client) {
/// let policy = RetryPolicy::default();
/// let url = "https://example.com/";
/// let body = fetch_with_retry(&policy, url, || fetch_page(&client, url)).await;
/// # }
/// ```
pub async fn fetch_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    url: &str,
    mut attempt: F,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    for n in 1..=policy.max_attempts {
        match attempt().await {
            Ok(value) => {
                if n > 1 {
                    tracing::debug!(url, attempt = n, "Fetch succeeded after retry");
                }
                return Some(value);
            }
            Err(e) if n == policy.max_attempts => {
                tracing::warn!(url, attempts = n, error = %e, "Fetch failed, retries exhausted");
            }
            Err(e) => {
                let backoff = policy.backoff_after(n);
                tracing::debug!(
                    url,
                    attempt = n,
                    error = %e,
                    backoff_ms = backoff.as_millis() as u64,
                    "Fetch failed, retrying"
                );
                tokio::time::sleep(backoff).await;
            }
        }
    }

    None
}
