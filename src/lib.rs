//! Weather proxy: a resilient HTTP facade over the National Weather
//! Service API.
//!
//! Translates a coordinate query into a normalized weather summary by
//! orchestrating two sequential upstream calls with bounded retries, then
//! validating, selecting and characterizing the returned forecast period.

pub mod config;
pub mod error;
pub mod fetch;
pub mod forecast;
pub mod nws;
pub mod web;

pub use config::Config;
pub use error::{ErrorCode, HttpError};
pub use fetch::{Backoff, FetchError, RetryPolicy};
pub use forecast::{ForecastPeriod, classify_temperature, select_today, validate_period};
pub use nws::{Coordinate, NwsClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
