//! Error types and handling for the weather proxy.
//!
//! Every failure that crosses the core's boundary is an [`HttpError`]: an
//! HTTP status, a machine-readable code, a human message and optional
//! structured details. Raw transport and parse errors never leave the
//! upstream client module.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Machine-readable error codes exposed to API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Coordinates missing, non-numeric or out of range
    InvalidCoordinatesPassed,
    /// Points response did not contain a forecast URL
    NwsForecastUrlMissing,
    /// Forecast response contained no periods
    NwsForecastEmpty,
    /// Transport failure, timeout or non-2xx after retries exhausted
    NwsUpstreamError,
    /// Selected period is not a well-formed record
    ForecastDataInvalid,
    /// Selected period is missing required fields
    ForecastDataIncomplete,
    /// Temperature field is not a finite number
    ForecastTemperatureInvalid,
    /// Unclassified failure
    InternalServerError,
}

impl ErrorCode {
    /// The wire representation of the code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidCoordinatesPassed => "INVALID_COORDINATES_PASSED",
            ErrorCode::NwsForecastUrlMissing => "NWS_FORECAST_URL_MISSING",
            ErrorCode::NwsForecastEmpty => "NWS_FORECAST_EMPTY",
            ErrorCode::NwsUpstreamError => "NWS_UPSTREAM_ERROR",
            ErrorCode::ForecastDataInvalid => "FORECAST_DATA_INVALID",
            ErrorCode::ForecastDataIncomplete => "FORECAST_DATA_INCOMPLETE",
            ErrorCode::ForecastTemperatureInvalid => "FORECAST_TEMPERATURE_INVALID",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

/// Normalized error carried through every failure path of the core.
#[derive(Debug, Error)]
#[error("{}: {message}", code.as_str())]
pub struct HttpError {
    /// HTTP status rendered at the boundary
    pub status: StatusCode,
    /// Stable machine-readable code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional structured details, logged but never rendered in responses
    pub details: Option<Value>,
}

impl HttpError {
    /// Create a new error with no details.
    pub fn new<S: Into<String>>(status: StatusCode, code: ErrorCode, message: S) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Coordinate validation failure (boundary, HTTP 400).
    pub fn invalid_coordinates<S: Into<String>>(message: S) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorCode::InvalidCoordinatesPassed,
            message,
        )
    }

    /// Upstream payload defect surfaced as a bad gateway (HTTP 502).
    pub fn bad_gateway<S: Into<String>>(code: ErrorCode, message: S) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, code, message)
    }
}

impl From<anyhow::Error> for HttpError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
            "An unexpected error occurred.",
        )
        .with_details(json!({ "message": err.to_string() }))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        tracing::error!(
            status = self.status.as_u16(),
            code = self.code.as_str(),
            message = %self.message,
            "request_error"
        );

        let body = json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        });
        (self.status, Json(body)).into_response()
    }
}
