//! National Weather Service client.
//!
//! Resolving a forecast takes two sequential hops: the points endpoint maps
//! a coordinate to a forecast URL, and that URL yields the period list. Each
//! hop goes through [`fetch::get_with_retry`]; this module is the single
//! place where raw fetch and decode failures are converted into the
//! normalized error taxonomy.

use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use axum::http::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::config::Config;
use crate::error::{ErrorCode, HttpError};
use crate::fetch::{self, FetchError, RetryPolicy};

/// A validated geographic coordinate.
///
/// Constructed only by the boundary's coordinate validation; latitude is in
/// [-90, 90] and longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Client for the NWS API, shared across requests.
#[derive(Debug, Clone)]
pub struct NwsClient {
    client: Client,
    base_url: String,
    policy: RetryPolicy,
}

impl NwsClient {
    /// Build a pooled client carrying the `User-Agent` and
    /// `Accept: application/geo+json` headers on every request.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/geo+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .with_context(|| format!("Invalid NWS user agent: {}", config.user_agent))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.nws_base_url.clone(),
            policy: config.retry_policy(),
        })
    }

    /// The configured upstream base URL, reported as the data source.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve the raw forecast period list for a coordinate.
    ///
    /// Periods stay untyped here; validation of the selected period happens
    /// downstream.
    ///
    /// # Errors
    ///
    /// - `NWS_FORECAST_URL_MISSING` when the points response has no
    ///   `properties.forecast` URL.
    /// - `NWS_FORECAST_EMPTY` when `properties.periods` is absent, not an
    ///   array, or empty.
    /// - `NWS_UPSTREAM_ERROR` for any transport failure, timeout, non-2xx
    ///   status or undecodable body, with the upstream status when known.
    #[instrument(skip(self), fields(lat = coord.latitude, lon = coord.longitude))]
    pub async fn fetch_forecast_periods(&self, coord: &Coordinate) -> Result<Vec<Value>, HttpError> {
        let points_url = format!(
            "{}/points/{},{}",
            self.base_url, coord.latitude, coord.longitude
        );

        info!(url = %points_url, "points_request_start");
        let points = self.get_json(&points_url).await.map_err(upstream_error)?;
        info!("points_request_success");

        let forecast_url = points
            .pointer("/properties/forecast")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                HttpError::bad_gateway(
                    ErrorCode::NwsForecastUrlMissing,
                    "National Weather Service response is missing the forecast URL.",
                )
            })?;

        info!(url = %forecast_url, "forecast_request_start");
        let forecast = self.get_json(forecast_url).await.map_err(upstream_error)?;
        info!("forecast_request_success");

        let periods = forecast
            .pointer("/properties/periods")
            .and_then(Value::as_array)
            .filter(|periods| !periods.is_empty())
            .ok_or_else(|| {
                HttpError::bad_gateway(
                    ErrorCode::NwsForecastEmpty,
                    "No forecast periods returned by National Weather Service.",
                )
            })?;

        Ok(periods.clone())
    }

    /// One resilient GET plus JSON decode, errors left raw.
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = fetch::get_with_retry(&self.client, url, &self.policy).await?;
        response.json().await.map_err(|source| FetchError::Transport {
            url: url.to_owned(),
            source,
        })
    }
}

/// The single conversion point from raw fetch failures to the normalized
/// taxonomy. Status comes from the upstream response when present.
fn upstream_error(err: FetchError) -> HttpError {
    error!(message = %err, "nws_request_failed");
    HttpError::new(
        err.status().unwrap_or(StatusCode::BAD_GATEWAY),
        ErrorCode::NwsUpstreamError,
        "Failed to get weather from National Weather Service.",
    )
}
