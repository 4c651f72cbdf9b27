//! Environment configuration.
//!
//! All settings are read once at startup from environment variables, each
//! with a working default so the service runs with zero configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::fetch::{Backoff, RetryPolicy};

/// Default outbound User-Agent, overridable via `NWS_USER_AGENT`.
pub const DEFAULT_USER_AGENT: &str = "weather-proxy (example@example.com)";
/// Default upstream base URL, overridable via `NWS_BASE_URL`.
pub const DEFAULT_BASE_URL: &str = "https://api.weather.gov";

/// Runtime configuration for the service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port (`PORT`)
    pub port: u16,
    /// Upstream base URL (`NWS_BASE_URL`)
    pub nws_base_url: String,
    /// Outbound User-Agent (`NWS_USER_AGENT`)
    pub user_agent: String,
    /// Retries after the initial attempt (`NWS_MAX_RETRIES`)
    pub max_retries: u32,
    /// Fixed delay between attempts in milliseconds (`NWS_RETRY_DELAY_MS`)
    pub retry_delay_ms: u64,
    /// Per-attempt timeout in milliseconds (`NWS_TIMEOUT_MS`)
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            nws_base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_retries: 2,
            retry_delay_ms: 200,
            timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_or("PORT", defaults.port),
            nws_base_url: env::var("NWS_BASE_URL")
                .unwrap_or(defaults.nws_base_url)
                .trim_end_matches('/')
                .to_string(),
            user_agent: env::var("NWS_USER_AGENT").unwrap_or(defaults.user_agent),
            max_retries: env_or("NWS_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("NWS_RETRY_DELAY_MS", defaults.retry_delay_ms),
            timeout_ms: env_or("NWS_TIMEOUT_MS", defaults.timeout_ms),
        }
    }

    /// The fetcher policy assembled from the retry settings.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff: Backoff::Fixed(Duration::from_millis(self.retry_delay_ms)),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

/// Read and parse an environment variable, keeping the default on absence
/// or parse failure.
fn env_or<T: FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %raw, "unparsable environment variable, using default");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.nws_base_url, "https://api.weather.gov");
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.retry_delay_ms, 200);
        assert_eq!(config.timeout_ms, 5000);
    }

    #[test]
    fn test_retry_policy_reflects_settings() {
        let config = Config {
            max_retries: 5,
            retry_delay_ms: 50,
            timeout_ms: 750,
            ..Config::default()
        };
        let policy = config.retry_policy();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.backoff, Backoff::Fixed(Duration::from_millis(50)));
        assert_eq!(policy.timeout, Duration::from_millis(750));
    }
}
