//! HTTP boundary: router, coordinate validation, response shaping and
//! request-scoped tracing.

use anyhow::{Context, Result};
use axum::extract::{Query, Request, State};
use axum::middleware::{self, Next};
use axum::response::{Json, Response};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{Instrument, info};

use crate::config::Config;
use crate::error::HttpError;
use crate::forecast::{self, classify_temperature};
use crate::nws::{Coordinate, NwsClient};

/// Shared state: one pooled upstream client for all requests.
#[derive(Clone)]
struct AppState {
    nws: NwsClient,
}

/// Build the application router.
pub fn app(config: &Config) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState {
        nws: NwsClient::new(config)?,
    };

    Ok(Router::new()
        .route("/weather", get(get_weather))
        .route("/", get(root))
        .with_state(state)
        .layer(middleware::from_fn(trace_requests))
        .layer(cors))
}

/// Bind and serve until the process is stopped.
pub async fn run(config: Config) -> Result<()> {
    let router = app(&config)?;
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Weather proxy running at http://localhost:{}", config.port);
    axum::serve(listener, router)
        .await
        .context("Server terminated")?;
    Ok(())
}

async fn root() -> &'static str {
    "Weather proxy running"
}

/// Raw query parameters; parsed manually so malformed numbers produce the
/// coordinate error instead of axum's generic rejection.
#[derive(Debug, Deserialize)]
struct WeatherQuery {
    lat: Option<String>,
    lon: Option<String>,
}

#[derive(Serialize)]
struct WeatherReport {
    latitude: f64,
    longitude: f64,
    forecast: ForecastSummary,
    source: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ForecastSummary {
    period_name: String,
    short_forecast: String,
    temperature: TemperatureSummary,
}

#[derive(Serialize)]
struct TemperatureSummary {
    value: f64,
    unit: String,
    characterization: &'static str,
}

async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherReport>, HttpError> {
    let coord = validate_coordinates(&query)?;

    let periods = state.nws.fetch_forecast_periods(&coord).await?;
    let today = forecast::validate_period(forecast::select_today(&periods))?;

    let characterization = if today.temperature_unit == "F" {
        classify_temperature(Some(today.temperature))
    } else {
        "unknown"
    };

    Ok(Json(WeatherReport {
        latitude: coord.latitude,
        longitude: coord.longitude,
        forecast: ForecastSummary {
            period_name: today.name,
            short_forecast: today.short_forecast,
            temperature: TemperatureSummary {
                value: today.temperature,
                unit: today.temperature_unit,
                characterization,
            },
        },
        source: state.nws.base_url().to_string(),
    }))
}

/// Parse and range-check `lat`/`lon` before the core is invoked.
fn validate_coordinates(query: &WeatherQuery) -> Result<Coordinate, HttpError> {
    let parse = |name: &str, raw: &Option<String>, min: f64, max: f64| {
        raw.as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && (min..=max).contains(v))
            .ok_or_else(|| {
                HttpError::invalid_coordinates("Use valid coordinates")
                    .with_details(json!({ "param": name }))
            })
    };

    Ok(Coordinate {
        latitude: parse("lat", &query.lat, -90.0, 90.0)?,
        longitude: parse("lon", &query.lon, -180.0, 180.0)?,
    })
}

/// Open a request-scoped span carrying a request id, so every event the
/// core emits below is attributable to one request.
async fn trace_requests(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(generate_request_id);

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        info!("request_started");
        let response = next.run(request).await;
        info!(status = response.status().as_u16(), "request_completed");
        response
    }
    .instrument(span)
    .await
}

fn generate_request_id() -> String {
    use rand::Rng;

    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let suffix: u32 = rand::rng().random();
    format!("{millis:x}-{:06x}", suffix & 0x00ff_ffff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn query(lat: Option<&str>, lon: Option<&str>) -> WeatherQuery {
        WeatherQuery {
            lat: lat.map(str::to_owned),
            lon: lon.map(str::to_owned),
        }
    }

    #[test]
    fn test_valid_coordinates_pass() {
        let coord = validate_coordinates(&query(Some("38.9"), Some("-77.0"))).unwrap();
        assert_eq!(coord.latitude, 38.9);
        assert_eq!(coord.longitude, -77.0);
    }

    #[test]
    fn test_boundary_values_pass() {
        assert!(validate_coordinates(&query(Some("90"), Some("-180"))).is_ok());
        assert!(validate_coordinates(&query(Some("-90"), Some("180"))).is_ok());
    }

    #[test]
    fn test_missing_parameter_is_rejected() {
        let err = validate_coordinates(&query(Some("38.9"), None)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCoordinatesPassed);
    }

    #[test]
    fn test_non_numeric_parameter_is_rejected() {
        let err = validate_coordinates(&query(Some("north"), Some("-77.0"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCoordinatesPassed);
        assert_eq!(err.details, Some(json!({ "param": "lat" })));
    }

    #[test]
    fn test_out_of_range_parameter_is_rejected() {
        assert!(validate_coordinates(&query(Some("90.1"), Some("0"))).is_err());
        assert!(validate_coordinates(&query(Some("0"), Some("180.5"))).is_err());
        assert!(validate_coordinates(&query(Some("NaN"), Some("0"))).is_err());
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(generate_request_id(), generate_request_id());
    }
}
