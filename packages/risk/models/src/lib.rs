#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Disease risk taxonomy types.
//!
//! Risk levels form a closed, totally ordered enumeration so that "worst
//! case dominates" comparisons are checked by the compiler instead of by
//! string comparison. The declaration order of [`Disease`] doubles as the
//! tie-break order used when several diseases share the highest level.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A tracked disease.
///
/// Variants are declared in tie-break order: when two diseases share the
/// highest risk level, the one declared first is reported as the
/// contributor.
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
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Disease {
    /// Dengue fever
    Dengue,
    /// Malaria
    Malaria,
    /// Heat stroke
    Heatstroke,
    /// Acute diarrhoeal disease
    Diarrhea,
}

impl Disease {
    /// Returns all variants of this enum, in tie-break order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Dengue, Self::Malaria, Self::Heatstroke, Self::Diarrhea]
    }
}

/// Ordinal risk classification.
///
/// The derived ordering is `Unknown < Low < Medium < High < Critical`.
/// Unrecognized strings deserialize to [`RiskLevel::Unknown`] rather than
/// failing the whole payload.
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
#[serde(rename_all = "lowercase", from = "String")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RiskLevel {
    /// No usable signal.
    Unknown,
    /// Low outbreak likelihood.
    Low,
    /// Medium outbreak likelihood.
    Medium,
    /// High outbreak likelihood.
    High,
    /// Critical outbreak likelihood.
    Critical,
}

/// Probability floors for [`RiskLevel::from_probability`], highest first.
const PROBABILITY_BANDS: &[(f64, RiskLevel)] = &[
    (0.75, RiskLevel::Critical),
    (0.5, RiskLevel::High),
    (0.25, RiskLevel::Medium),
    (0.0, RiskLevel::Low),
];

impl RiskLevel {
    /// Returns the ordinal value of this level (0 for unknown, 4 for critical).
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Classifies a raw outbreak probability.
    ///
    /// Non-finite or out-of-range probabilities yield [`RiskLevel::Unknown`].
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Self::Unknown;
        }
        PROBABILITY_BANDS
            .iter()
            .find(|(floor, _)| probability >= *floor)
            .map_or(Self::Unknown, |(_, level)| *level)
    }

    /// Returns all variants of this enum, lowest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Unknown,
            Self::Low,
            Self::Medium,
            Self::High,
            Self::Critical,
        ]
    }
}

impl From<String> for RiskLevel {
    fn from(value: String) -> Self {
        value.trim().parse().unwrap_or(Self::Unknown)
    }
}

/// One disease's risk prediction for one location in one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRiskRecord {
    /// Which disease this record describes.
    pub disease: Disease,
    /// Outbreak probability in `[0, 1]`.
    pub probability: f64,
    /// Predicted risk level.
    pub risk_level: RiskLevel,
    /// Predicted case rate per 100k residents, when the model reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_per_100k: Option<f64>,
}

/// Overall risk of a location, derived from its per-disease records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverallRisk {
    /// Highest level across all records.
    pub level: RiskLevel,
    /// Disease that produced `level`, if any disease carries a known level.
    pub contributing_disease: Option<Disease>,
}

impl OverallRisk {
    /// The overall risk of a location with no usable records.
    pub const UNKNOWN: Self = Self {
        level: RiskLevel::Unknown,
        contributing_disease: None,
    };
}

impl Default for OverallRisk {
    fn default() -> Self {
        Self::UNKNOWN
    }
}
