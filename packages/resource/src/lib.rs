#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Resource gap calculation.
//!
//! Turns current and predicted resource counts into normalized coverage
//! ratios, classifies them with the table-driven [`policy::GapPolicy`], and
//! produces the shortage recommendations shown in the detail panel.

pub mod policy;

use std::collections::BTreeMap;

use health_map_resource_models::{
    GapStatus, Recommendation, ResourceCategory, ResourceGap, ResourceSnapshot,
};
use thiserror::Error;

use crate::policy::GapPolicy;

/// Errors that can occur during gap calculation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceError {
    /// A count was negative. Upstream data is expected to be validated, so
    /// this is reported rather than clamped.
    #[error("Invalid quantity for {category}: {field} = {value}")]
    InvalidQuantity {
        /// Category the count belongs to.
        category: ResourceCategory,
        /// Which count was invalid (`"available"` or `"predicted_need"`).
        field: &'static str,
        /// The offending value.
        value: i64,
    },

    /// The gap policy table is invalid.
    #[error("Gap policy error: {message}")]
    Policy {
        /// Description of what went wrong.
        message: String,
    },
}

/// Computes [`ResourceGap`]s under a [`GapPolicy`].
#[derive(Debug, Clone, Default)]
pub struct GapCalculator {
    policy: GapPolicy,
}

impl GapCalculator {
    /// Creates a calculator using the given policy.
    #[must_use]
    pub const fn new(policy: GapPolicy) -> Self {
        Self { policy }
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn policy(&self) -> &GapPolicy {
        &self.policy
    }

    /// Computes the coverage of one resource category.
    ///
    /// A zero predicted need is fully covered (ratio 100, sufficient).
    /// Otherwise the ratio is `available / predicted * 100` clamped to
    /// `[0, 100]` and classified by the policy.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidQuantity`] if either count is
    /// negative.
    #[allow(clippy::cast_precision_loss)]
    pub fn gap(
        &self,
        category: ResourceCategory,
        available: i64,
        predicted: i64,
    ) -> Result<ResourceGap, ResourceError> {
        if available < 0 {
            return Err(ResourceError::InvalidQuantity {
                category,
                field: "available",
                value: available,
            });
        }
        if predicted < 0 {
            return Err(ResourceError::InvalidQuantity {
                category,
                field: "predicted_need",
                value: predicted,
            });
        }

        if predicted == 0 {
            return Ok(ResourceGap {
                category,
                ratio: 100.0,
                status: GapStatus::Sufficient,
            });
        }

        let ratio = (available as f64 / predicted as f64 * 100.0).clamp(0.0, 100.0);
        Ok(ResourceGap {
            category,
            ratio,
            status: self.policy.classify(ratio),
        })
    }

    /// Computes the gap of every snapshot, in input order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ResourceError::InvalidQuantity`] encountered.
    pub fn gaps(&self, snapshots: &[ResourceSnapshot]) -> Result<Vec<ResourceGap>, ResourceError> {
        snapshots
            .iter()
            .map(|s| self.gap(s.category, s.available, s.predicted_need))
            .collect()
    }

    /// Builds the shortage recommendations for a location.
    ///
    /// Only non-sufficient categories are kept. An empty result means every
    /// category is covered.
    ///
    /// # Errors
    ///
    /// Returns the first [`ResourceError::InvalidQuantity`] encountered.
    pub fn recommendations(
        &self,
        location_name: &str,
        snapshots: &[ResourceSnapshot],
    ) -> Result<Vec<Recommendation>, ResourceError> {
        let mut recommendations = Vec::new();

        for snapshot in snapshots {
            let gap = self.gap(snapshot.category, snapshot.available, snapshot.predicted_need)?;
            if gap.status == GapStatus::Sufficient {
                continue;
            }

            let shortfall = snapshot.predicted_need.saturating_sub(snapshot.available).max(0);
            let shortfall = u64::try_from(shortfall).unwrap_or_default();
            recommendations.push(Recommendation {
                category: gap.category,
                ratio: gap.ratio,
                status: gap.status,
                shortfall,
                message: format!(
                    "Need {shortfall} more {} in {location_name}",
                    gap.category.label()
                ),
            });
        }

        Ok(recommendations)
    }
}

/// Computes one gap with the embedded default policy.
///
/// # Errors
///
/// Returns [`ResourceError::InvalidQuantity`] if either count is negative.
pub fn gap(
    category: ResourceCategory,
    available: i64,
    predicted: i64,
) -> Result<ResourceGap, ResourceError> {
    GapCalculator::default().gap(category, available, predicted)
}

/// Joins the `current` and `predicted` maps of a resource prediction into
/// snapshots, in [`ResourceCategory::all`] order.
///
/// Keys that are not a known category, and categories missing from either
/// side, are skipped.
#[must_use]
pub fn snapshots_from_maps(
    current: &BTreeMap<String, i64>,
    predicted: &BTreeMap<String, i64>,
) -> Vec<ResourceSnapshot> {
    for key in current.keys().chain(predicted.keys()) {
        if key.parse::<ResourceCategory>().is_err() {
            log::debug!("Ignoring unknown resource key '{key}'");
        }
    }

    ResourceCategory::all()
        .iter()
        .filter_map(|category| {
            let lookup = |map: &BTreeMap<String, i64>| {
                map.iter()
                    .find(|(key, _)| key.parse::<ResourceCategory>().ok() == Some(*category))
                    .map(|(_, value)| *value)
            };

            match (lookup(current), lookup(predicted)) {
                (Some(available), Some(predicted_need)) => Some(ResourceSnapshot {
                    category: *category,
                    available,
                    predicted_need,
                }),
                (available, predicted_need) => {
                    log::debug!(
                        "Skipping {category}: available={available:?} predicted={predicted_need:?}"
                    );
                    None
                }
            }
        })
        .collect()
}
