//! Payload decoders.
//!
//! The prediction API has served a few shapes over time. These decoders
//! accept all of them and produce the canonical types from
//! [`health_map_source_models`]. Unknown disease and resource keys are
//! logged and skipped; a payload missing its required top-level fields is a
//! [`SourceError::Decode`].

use std::collections::BTreeMap;

use health_map_alert_models::Alert;
use health_map_location_models::Location;
use health_map_risk_models::{Disease, DiseaseRiskRecord, RiskLevel};
use health_map_source_models::{ResourcePrediction, RiskPrediction};
use serde_json::Value;

use crate::SourceError;

/// Key of the aggregate entry in a `risk_prediction` map.
const OVERALL_KEY: &str = "overall";

fn decode_error(message: impl Into<String>) -> SourceError {
    SourceError::Decode {
        message: message.into(),
    }
}

/// Returns the array itself, or the array under `key` of an envelope
/// object.
fn array_or_envelope<'a>(value: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    value
        .as_array()
        .or_else(|| value.get(key).and_then(Value::as_array))
}

/// Decodes the location list.
///
/// Accepts a bare array or `{"locations": [...]}`.
///
/// # Errors
///
/// Returns [`SourceError::Decode`] if no array is found, or
/// [`SourceError::Json`] if an entry is not a valid location.
pub fn locations(value: &Value) -> Result<Vec<Location>, SourceError> {
    let entries = array_or_envelope(value, "locations")
        .ok_or_else(|| decode_error("expected a location array"))?;

    entries
        .iter()
        .map(|entry| serde_json::from_value(entry.clone()).map_err(SourceError::from))
        .collect()
}

/// Reads a per-100k rate, accepting both `rate_per_100k` and `rate`.
fn rate_of(entry: &Value) -> Option<f64> {
    entry
        .get("rate_per_100k")
        .or_else(|| entry.get("rate"))
        .and_then(Value::as_f64)
        .filter(|rate| rate.is_finite())
}

/// Builds one record from a per-disease entry.
///
/// A missing `risk_level` is derived from the probability. A present but
/// unrecognized level stays [`RiskLevel::Unknown`].
fn risk_record(disease: Disease, entry: &Value) -> DiseaseRiskRecord {
    let probability = entry
        .get("probability")
        .and_then(Value::as_f64)
        .unwrap_or(f64::NAN);

    let risk_level = match entry.get("risk_level") {
        Some(Value::String(level)) => RiskLevel::from(level.clone()),
        Some(_) => RiskLevel::Unknown,
        None => RiskLevel::from_probability(probability),
    };

    DiseaseRiskRecord {
        disease,
        probability,
        risk_level,
        rate_per_100k: rate_of(entry),
    }
}

/// Decodes a risk prediction.
///
/// Accepts a `disease_risks` array of records, or a `risk_prediction` map
/// keyed by disease whose `overall` entry supplies the overall rate. The
/// climate inputs are read from `climate_snapshot` or `climate_data`.
///
/// # Errors
///
/// Returns [`SourceError::Decode`] if neither shape is present.
pub fn risk_prediction(value: &Value) -> Result<RiskPrediction, SourceError> {
    let mut overall_rate = value
        .get("overall_rate")
        .and_then(Value::as_f64)
        .filter(|rate| rate.is_finite());

    let disease_risks = if let Some(entries) = value.get("disease_risks").and_then(Value::as_array)
    {
        entries
            .iter()
            .filter_map(|entry| {
                let name = entry.get("disease").and_then(Value::as_str)?;
                if let Ok(disease) = name.parse::<Disease>() {
                    Some(risk_record(disease, entry))
                } else {
                    log::warn!("Skipping risk record for unknown disease '{name}'");
                    None
                }
            })
            .collect()
    } else if let Some(map) = value.get("risk_prediction").and_then(Value::as_object) {
        let mut records = Vec::with_capacity(map.len());
        for (key, entry) in map {
            if key == OVERALL_KEY {
                overall_rate = overall_rate.or_else(|| rate_of(entry));
                continue;
            }
            match key.parse::<Disease>() {
                Ok(disease) => records.push(risk_record(disease, entry)),
                Err(_) => log::warn!("Skipping risk entry for unknown disease '{key}'"),
            }
        }
        records
    } else {
        return Err(decode_error(
            "risk payload has neither 'disease_risks' nor 'risk_prediction'",
        ));
    };

    let climate_snapshot = value
        .get("climate_snapshot")
        .or_else(|| value.get("climate_data"))
        .cloned()
        .unwrap_or(Value::Null);

    Ok(RiskPrediction {
        disease_risks,
        climate_snapshot,
        overall_rate,
    })
}

/// Reads a resource count. Fractional model output is rounded up, since a
/// partial bed still needs a whole bed. Negative fractions round away from
/// zero so they stay negative and are rejected downstream.
#[allow(clippy::cast_possible_truncation)]
fn count_of(key: &str, value: &Value) -> Option<i64> {
    if let Some(count) = value.as_i64() {
        return Some(count);
    }
    match value.as_f64() {
        Some(count) if count.is_finite() && count < 0.0 => Some(count.floor() as i64),
        Some(count) if count.is_finite() => Some(count.ceil() as i64),
        _ => {
            log::warn!("Skipping non-numeric resource count {key}={value}");
            None
        }
    }
}

fn count_map(value: &Value, keys: &[&str]) -> Result<BTreeMap<String, i64>, SourceError> {
    let map = keys
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_object))
        .ok_or_else(|| decode_error(format!("resource payload is missing '{}'", keys[0])))?;

    Ok(map
        .iter()
        .filter_map(|(key, count)| count_of(key, count).map(|count| (key.clone(), count)))
        .collect())
}

/// Decodes a resource prediction.
///
/// Reads `current`/`current_resources` and `predicted`/`predicted_resources`.
///
/// # Errors
///
/// Returns [`SourceError::Decode`] if either map is missing.
pub fn resource_prediction(value: &Value) -> Result<ResourcePrediction, SourceError> {
    Ok(ResourcePrediction {
        current: count_map(value, &["current", "current_resources"])?,
        predicted: count_map(value, &["predicted", "predicted_resources"])?,
    })
}

/// Decodes the alert list.
///
/// Accepts a bare array or the `{date, alert_count, alerts}` envelope.
/// Alerts without their own date inherit the envelope date. Malformed
/// entries are logged and skipped.
///
/// # Errors
///
/// Returns [`SourceError::Decode`] if no array is found.
pub fn alerts(value: &Value) -> Result<Vec<Alert>, SourceError> {
    let entries =
        array_or_envelope(value, "alerts").ok_or_else(|| decode_error("expected an alert array"))?;

    let envelope_date = value
        .get("date")
        .and_then(Value::as_str)
        .and_then(|date| date.parse().ok());

    Ok(entries
        .iter()
        .filter_map(|entry| match serde_json::from_value::<Alert>(entry.clone()) {
            Ok(mut alert) => {
                alert.date = alert.date.or(envelope_date);
                Some(alert)
            }
            Err(e) => {
                log::warn!("Skipping malformed alert: {e}");
                None
            }
        })
        .collect())
}
