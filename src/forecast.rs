//! Forecast period selection, validation and temperature characterization.
//!
//! Upstream periods arrive as untyped JSON; [`select_today`] picks the
//! representative period and [`validate_period`] turns it into a typed
//! [`ForecastPeriod`] or a normalized error.

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{ErrorCode, HttpError};

/// Sentinel characterization for a missing or NaN temperature. Part of the
/// public API contract, preserved verbatim.
pub const MISSING_TEMP: &str = "pls pass temp";

/// A forecast period that passed validation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForecastPeriod {
    /// Period name, e.g. "Today" or "Tonight"
    pub name: String,
    /// Whether the period covers daytime hours
    pub is_daytime: bool,
    pub temperature: f64,
    /// Temperature unit as reported upstream ("F" or other)
    pub temperature_unit: String,
    /// Short human-readable summary, e.g. "Sunny"
    pub short_forecast: String,
}

/// Pick the representative "today" period: the first daytime period, else
/// the first in list order. The caller guarantees `periods` is non-empty.
#[must_use]
pub fn select_today(periods: &[Value]) -> &Value {
    periods
        .iter()
        .find(|period| {
            period
                .get("isDaytime")
                .and_then(Value::as_bool)
                .unwrap_or(false)
        })
        .unwrap_or(&periods[0])
}

/// Validate the selected period and lift it into a [`ForecastPeriod`].
///
/// All missing required fields are collected in one pass and reported
/// together in `details.missingFields`; only `temperature` additionally
/// carries a type check.
pub fn validate_period(period: &Value) -> Result<ForecastPeriod, HttpError> {
    let Some(record) = period.as_object() else {
        return Err(HttpError::bad_gateway(
            ErrorCode::ForecastDataInvalid,
            "National Weather Service returned invalid forecast data.",
        ));
    };

    let present = |field: &str| record.get(field).is_some_and(|v| !v.is_null());

    let mut missing_fields = Vec::new();
    for field in ["name", "shortForecast", "temperature", "temperatureUnit"] {
        if !present(field) {
            missing_fields.push(field);
        }
    }

    if !missing_fields.is_empty() {
        return Err(HttpError::bad_gateway(
            ErrorCode::ForecastDataIncomplete,
            "National Weather Service returned incomplete forecast data.",
        )
        .with_details(json!({ "missingFields": missing_fields })));
    }

    let temperature = record
        .get("temperature")
        .and_then(Value::as_f64)
        .filter(|t| t.is_finite())
        .ok_or_else(|| {
            HttpError::bad_gateway(
                ErrorCode::ForecastTemperatureInvalid,
                "Forecast temperature is not a valid number.",
            )
        })?;

    Ok(ForecastPeriod {
        name: field_text(&record["name"]),
        is_daytime: record
            .get("isDaytime")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        temperature,
        temperature_unit: field_text(&record["temperatureUnit"]),
        short_forecast: field_text(&record["shortForecast"]),
    })
}

// Presence, not type, is what validation checks for the textual fields;
// non-string values pass through in their compact JSON form.
fn field_text(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), str::to_owned)
}

/// Map a Fahrenheit temperature to a coarse category.
///
/// Pure and total: `None` and NaN yield the [`MISSING_TEMP`] sentinel. The
/// caller applies this only when the period's unit is "F"; other units map
/// to "unknown" without consulting the value.
#[must_use]
pub fn classify_temperature(temp_f: Option<f64>) -> &'static str {
    match temp_f {
        None => MISSING_TEMP,
        Some(t) if t.is_nan() => MISSING_TEMP,
        Some(t) if t <= 45.0 => "cold",
        Some(t) if t >= 80.0 => "hot",
        Some(_) => "moderate",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn period(name: &str, is_daytime: bool) -> Value {
        json!({
            "name": name,
            "isDaytime": is_daytime,
            "temperature": 50,
            "temperatureUnit": "F",
            "shortForecast": "Sunny"
        })
    }

    #[rstest]
    #[case(Some(f64::NEG_INFINITY), "cold")]
    #[case(Some(-10.0), "cold")]
    #[case(Some(45.0), "cold")]
    #[case(Some(45.1), "moderate")]
    #[case(Some(50.0), "moderate")]
    #[case(Some(79.9), "moderate")]
    #[case(Some(80.0), "hot")]
    #[case(Some(120.0), "hot")]
    #[case(Some(f64::NAN), "pls pass temp")]
    #[case(None, "pls pass temp")]
    fn test_classifier_partition(#[case] temp: Option<f64>, #[case] expected: &str) {
        assert_eq!(classify_temperature(temp), expected);
    }

    #[test]
    fn test_select_prefers_first_daytime_period() {
        let periods = vec![
            period("Tonight", false),
            period("Tomorrow", true),
            period("Tomorrow Night", false),
        ];
        assert_eq!(select_today(&periods)["name"], json!("Tomorrow"));
    }

    #[test]
    fn test_select_falls_back_to_first_period() {
        let periods = vec![period("Tonight", false), period("Overnight", false)];
        assert_eq!(select_today(&periods)["name"], json!("Tonight"));
    }

    #[test]
    fn test_select_is_idempotent() {
        let periods = vec![period("Tonight", false), period("Tomorrow", true)];
        let first = select_today(&periods).clone();
        let second = select_today(&periods).clone();
        assert_eq!(first, second);
        assert_eq!(first["isDaytime"], json!(true));
    }

    #[test]
    fn test_select_treats_missing_daytime_flag_as_night() {
        let periods = vec![json!({ "name": "Unflagged" }), period("Today", true)];
        assert_eq!(select_today(&periods)["name"], json!("Today"));
    }

    #[test]
    fn test_validate_accepts_complete_period() {
        let validated = validate_period(&period("Today", true)).unwrap();
        assert_eq!(
            validated,
            ForecastPeriod {
                name: "Today".into(),
                is_daytime: true,
                temperature: 50.0,
                temperature_unit: "F".into(),
                short_forecast: "Sunny".into(),
            }
        );
    }

    #[test]
    fn test_validate_rejects_non_object() {
        let err = validate_period(&json!("not a record")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ForecastDataInvalid);

        let err = validate_period(&json!(null)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ForecastDataInvalid);
    }

    #[test]
    fn test_validate_collects_all_missing_fields_in_order() {
        let err = validate_period(&json!({
            "shortForecast": "Sunny",
            "temperatureUnit": "F",
        }))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ForecastDataIncomplete);
        assert_eq!(
            err.details,
            Some(json!({ "missingFields": ["name", "temperature"] }))
        );
    }

    #[test]
    fn test_validate_treats_null_as_missing() {
        let err = validate_period(&json!({
            "name": null,
            "shortForecast": "Sunny",
            "temperature": 50,
            "temperatureUnit": "F",
        }))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ForecastDataIncomplete);
        assert_eq!(err.details, Some(json!({ "missingFields": ["name"] })));
    }

    #[test]
    fn test_validate_rejects_non_numeric_temperature() {
        let err = validate_period(&json!({
            "name": "Today",
            "shortForecast": "Sunny",
            "temperature": "50",
            "temperatureUnit": "F",
        }))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ForecastTemperatureInvalid);
    }
}
