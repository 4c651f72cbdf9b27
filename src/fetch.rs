//! Resilient HTTP fetching.
//!
//! [`get_with_retry`] wraps a single GET in bounded retry-with-delay
//! semantics: every transport error, timeout or non-2xx status counts as a
//! failed attempt and is retried until the budget is spent. This layer never
//! normalizes errors; the last raw [`FetchError`] is propagated to the
//! caller, which decides how to classify it.

use std::time::Duration;

use axum::http::StatusCode;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Default number of retries after the initial attempt.
pub const DEFAULT_RETRIES: u32 = 2;
/// Default delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);
/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// A failed fetch, preserved raw for the caller to classify.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, timeout or body-decode failure
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with a non-2xx status
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: StatusCode },
}

impl FetchError {
    /// The upstream HTTP status, when the failure carries one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Transport { source, .. } => source.status(),
            FetchError::Status { status, .. } => Some(*status),
        }
    }
}

/// Delay strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Constant delay between attempts
    Fixed(Duration),
    /// Doubling delay: `base`, `2*base`, `4*base`, ...
    Exponential { base: Duration },
}

impl Backoff {
    /// Delay to wait before the given retry (1-based).
    #[must_use]
    pub fn delay(&self, retry: u32) -> Duration {
        match self {
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential { base } => *base * 2u32.saturating_pow(retry.saturating_sub(1)),
        }
    }
}

/// Retry budget and timing for [`get_with_retry`].
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the initial attempt; 0 means a single attempt
    pub max_retries: u32,
    /// Delay strategy between attempts
    pub backoff: Backoff,
    /// Per-attempt timeout
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_RETRIES,
            backoff: Backoff::Fixed(DEFAULT_RETRY_DELAY),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// GET `url`, retrying failed attempts per `policy`.
///
/// Emits one `http_attempt` event per try, one `http_retry` event per retry
/// and a single `http_attempt_failed` event when the budget is exhausted.
/// Headers ride on `client` (default headers set at construction).
pub async fn get_with_retry(
    client: &Client,
    url: &str,
    policy: &RetryPolicy,
) -> Result<reqwest::Response, FetchError> {
    let mut attempt: u32 = 0;
    loop {
        debug!(url = %url, attempt, "http_attempt");

        let failure = match client.get(url).timeout(policy.timeout).send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => FetchError::Status {
                url: url.to_owned(),
                status: response.status(),
            },
            Err(source) => FetchError::Transport {
                url: url.to_owned(),
                source,
            },
        };

        if attempt >= policy.max_retries {
            error!(url = %url, attempt, message = %failure, "http_attempt_failed");
            return Err(failure);
        }

        attempt += 1;
        warn!(url = %url, attempt, "http_retry");
        tokio::time::sleep(policy.backoff.delay(attempt)).await;
    }
}
