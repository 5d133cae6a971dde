#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hospital resource types.
//!
//! A [`ResourceSnapshot`] pairs what a location has with what the model
//! predicts it will need. A deficit (`available < predicted_need`) is an
//! expected state, not an error.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A tracked hospital resource.
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
pub enum ResourceCategory {
    /// Hospital beds
    Beds,
    /// Doctors on staff
    Doctors,
    /// Nurses on staff
    Nurses,
    /// IV fluid stock (units)
    IvFluids,
    /// Antibiotic stock (units)
    Antibiotics,
    /// Antipyretic stock (units)
    Antipyretics,
}

impl ResourceCategory {
    /// Human-readable plural noun used in recommendation messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Beds => "beds",
            Self::Doctors => "doctors",
            Self::Nurses => "nurses",
            Self::IvFluids => "IV fluid units",
            Self::Antibiotics => "antibiotic units",
            Self::Antipyretics => "antipyretic units",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Beds,
            Self::Doctors,
            Self::Nurses,
            Self::IvFluids,
            Self::Antibiotics,
            Self::Antipyretics,
        ]
    }
}

/// Current and predicted counts for one resource category.
///
/// Counts are signed so that negative upstream values reach the gap
/// calculator and are rejected there instead of being masked at decode
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    /// Resource category.
    pub category: ResourceCategory,
    /// Units currently available.
    pub available: i64,
    /// Units the model predicts will be needed.
    pub predicted_need: i64,
}

/// Coverage status of a resource category.
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
pub enum GapStatus {
    /// Available stock covers the predicted need.
    Sufficient,
    /// Partially covered.
    Warning,
    /// Seriously under-covered.
    Critical,
}

/// Normalized availability of one resource category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceGap {
    /// Resource category.
    pub category: ResourceCategory,
    /// Percentage of predicted need that is covered, in `[0, 100]`.
    pub ratio: f64,
    /// Status band the ratio falls in.
    pub status: GapStatus,
}

/// A non-sufficient gap with an actionable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Resource category.
    pub category: ResourceCategory,
    /// Percentage of predicted need that is covered.
    pub ratio: f64,
    /// Status band (never [`GapStatus::Sufficient`]).
    pub status: GapStatus,
    /// Units missing to fully cover the predicted need.
    pub shortfall: u64,
    /// Human-readable deficit message.
    pub message: String,
}
