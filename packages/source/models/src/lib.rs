#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Prediction payloads and fetch failure types.
//!
//! These are the decoded shapes every dashboard source returns, plus the
//! section-scoped [`FetchFailure`] the dashboard shows when a fetch fails.

use std::collections::BTreeMap;
use std::fmt;

use health_map_risk_models::DiseaseRiskRecord;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which dashboard section a fetch belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FetchCategory {
    /// Location catalog.
    Locations,
    /// Per-location disease risk prediction.
    Risk,
    /// Per-location resource prediction.
    Resources,
    /// Alert feed.
    Alerts,
}

/// A failed fetch, scoped to one dashboard section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    /// Section the fetch belonged to.
    pub category: FetchCategory,
    /// Human-readable reason.
    pub reason: String,
}

impl FetchFailure {
    /// Creates a failure for `category`.
    #[must_use]
    pub fn new(category: FetchCategory, reason: impl Into<String>) -> Self {
        Self {
            category,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fetch failed: {}", self.category, self.reason)
    }
}

impl std::error::Error for FetchFailure {}

/// Decoded risk prediction for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPrediction {
    /// One record per disease.
    pub disease_risks: Vec<DiseaseRiskRecord>,
    /// Climate inputs behind the prediction, passed through untouched.
    #[serde(default)]
    pub climate_snapshot: serde_json::Value,
    /// Overall per-100k case rate, when the backend reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_rate: Option<f64>,
}

/// Decoded resource prediction for one location, keyed by resource name.
///
/// Keys are kept as strings so that categories the dashboard does not track
/// survive decoding and can be skipped later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePrediction {
    /// Units currently available.
    pub current: BTreeMap<String, i64>,
    /// Units predicted to be needed.
    pub predicted: BTreeMap<String, i64>,
}
