//! Table-driven gap status policy.
//!
//! The status bands live in `policy/gap_bands.toml`, embedded at compile
//! time. Tuning a threshold means editing that file; no call site knows
//! the numbers.

use health_map_resource_models::GapStatus;
use serde::Deserialize;

use crate::ResourceError;

/// Embedded default policy.
const GAP_BANDS_TOML: &str = include_str!("../policy/gap_bands.toml");

/// One status band: every ratio at or above `min_ratio` (and below the next
/// higher band) gets `status`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GapBand {
    /// Status assigned to ratios in this band.
    pub status: GapStatus,
    /// Inclusive lower bound of the band, in percent.
    pub min_ratio: f64,
}

#[derive(Debug, Deserialize)]
struct GapPolicyFile {
    band: Vec<GapBand>,
}

/// Ordered set of [`GapBand`]s, highest floor first.
#[derive(Debug, Clone, PartialEq)]
pub struct GapPolicy {
    bands: Vec<GapBand>,
}

impl GapPolicy {
    /// Parses a policy from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Policy`] if the TOML is malformed, a floor is
    /// not a finite number in `[0, 100]`, or no band starts at 0 (which would
    /// leave low ratios unclassified).
    pub fn from_toml(toml_str: &str) -> Result<Self, ResourceError> {
        let file: GapPolicyFile = toml::de::from_str(toml_str).map_err(|e| ResourceError::Policy {
            message: format!("failed to parse gap policy: {e}"),
        })?;
        Self::from_bands(file.band)
    }

    /// Builds a policy from an arbitrary list of bands.
    ///
    /// # Errors
    ///
    /// Same validation as [`Self::from_toml`].
    pub fn from_bands(mut bands: Vec<GapBand>) -> Result<Self, ResourceError> {
        if let Some(bad) = bands
            .iter()
            .find(|b| !b.min_ratio.is_finite() || !(0.0..=100.0).contains(&b.min_ratio))
        {
            return Err(ResourceError::Policy {
                message: format!("band {:?} has out-of-range floor {}", bad.status, bad.min_ratio),
            });
        }
        if !bands.iter().any(|b| b.min_ratio <= 0.0) {
            return Err(ResourceError::Policy {
                message: "gap policy needs a band starting at 0".to_string(),
            });
        }

        bands.sort_by(|a, b| b.min_ratio.total_cmp(&a.min_ratio));
        Ok(Self { bands })
    }

    /// Returns the compile-time embedded policy.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed. It is a compile-time
    /// constant, so a failure here is a development error caught by tests.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml(GAP_BANDS_TOML)
            .unwrap_or_else(|e| panic!("Failed to load embedded gap policy: {e}"))
    }

    /// Classifies a ratio (percent) into a status.
    #[must_use]
    pub fn classify(&self, ratio: f64) -> GapStatus {
        self.bands
            .iter()
            .find(|band| ratio >= band.min_ratio)
            .map_or(GapStatus::Critical, |band| band.status)
    }

    /// Bands in evaluation order, highest floor first.
    #[must_use]
    pub fn bands(&self) -> &[GapBand] {
        &self.bands
    }
}

impl Default for GapPolicy {
    fn default() -> Self {
        Self::embedded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_policy_loads() {
        let policy = GapPolicy::embedded();
        assert_eq!(policy.bands().len(), 3);
        for window in policy.bands().windows(2) {
            assert!(window[0].min_ratio > window[1].min_ratio);
        }
    }

    #[test]
    fn embedded_policy_edges() {
        let policy = GapPolicy::embedded();
        assert_eq!(policy.classify(100.0), GapStatus::Sufficient);
        assert_eq!(policy.classify(99.9), GapStatus::Warning);
        assert_eq!(policy.classify(70.0), GapStatus::Warning);
        assert_eq!(policy.classify(69.9), GapStatus::Critical);
        assert_eq!(policy.classify(0.0), GapStatus::Critical);
    }

    #[test]
    fn bands_are_sorted_regardless_of_file_order() {
        let policy = GapPolicy::from_toml(
            r#"
            [[band]]
            status = "critical"
            min_ratio = 0.0

            [[band]]
            status = "sufficient"
            min_ratio = 90.0

            [[band]]
            status = "warning"
            min_ratio = 50.0
            "#,
        )
        .unwrap();

        assert_eq!(policy.classify(95.0), GapStatus::Sufficient);
        assert_eq!(policy.classify(60.0), GapStatus::Warning);
        assert_eq!(policy.classify(10.0), GapStatus::Critical);
    }

    #[test]
    fn rejects_policy_without_zero_floor() {
        let err = GapPolicy::from_bands(vec![GapBand {
            status: GapStatus::Sufficient,
            min_ratio: 100.0,
        }])
        .unwrap_err();
        assert!(matches!(err, ResourceError::Policy { .. }));
    }

    #[test]
    fn rejects_out_of_range_floor() {
        let err = GapPolicy::from_bands(vec![
            GapBand {
                status: GapStatus::Critical,
                min_ratio: 0.0,
            },
            GapBand {
                status: GapStatus::Sufficient,
                min_ratio: 150.0,
            },
        ])
        .unwrap_err();
        assert!(matches!(err, ResourceError::Policy { .. }));
    }
}
