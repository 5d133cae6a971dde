//! Color scales.
//!
//! The ordinal risk scale is fixed. Rate scales are stepped sequential
//! ramps whose breakpoints live in `scales/<filter>.toml`, embedded at
//! compile time.

use health_map_risk_models::RiskLevel;
use serde::Deserialize;

use crate::{ColorToken, DiseaseFilter, LegendEntry, MapError, RAMP_STEPS};

/// Embedded breakpoint tables, one per filter.
const SCALE_TOMLS: &[(DiseaseFilter, &str)] = &[
    (DiseaseFilter::Overall, include_str!("../scales/overall.toml")),
    (DiseaseFilter::Dengue, include_str!("../scales/dengue.toml")),
    (DiseaseFilter::Malaria, include_str!("../scales/malaria.toml")),
    (DiseaseFilter::Heatstroke, include_str!("../scales/heatstroke.toml")),
    (DiseaseFilter::Diarrhea, include_str!("../scales/diarrhea.toml")),
];

/// Maps a risk level onto the shared five-point ordinal scale.
#[must_use]
pub const fn risk_color(level: RiskLevel) -> ColorToken {
    match level {
        RiskLevel::Unknown => ColorToken::Gray,
        RiskLevel::Low => ColorToken::Green,
        RiskLevel::Medium => ColorToken::Yellow,
        RiskLevel::High => ColorToken::Orange,
        RiskLevel::Critical => ColorToken::Red,
    }
}

/// Legend of the ordinal risk scale, lowest level first.
#[must_use]
pub fn risk_legend() -> Vec<LegendEntry> {
    RiskLevel::all()
        .iter()
        .map(|level| LegendEntry {
            label: level.to_string(),
            color: risk_color(*level),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RateScaleFile {
    filter: DiseaseFilter,
    breakpoints: Vec<f64>,
}

/// A stepped sequential scale over per-100k case rates.
#[derive(Debug, Clone, PartialEq)]
pub struct RateScale {
    filter: DiseaseFilter,
    breakpoints: Vec<f64>,
}

impl RateScale {
    /// Parses a scale from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Policy`] if the TOML is malformed or the
    /// breakpoints are invalid (see [`Self::new`]).
    pub fn from_toml(toml_str: &str) -> Result<Self, MapError> {
        let file: RateScaleFile = toml::de::from_str(toml_str).map_err(|e| MapError::Policy {
            message: format!("failed to parse rate scale: {e}"),
        })?;
        Self::new(file.filter, file.breakpoints)
    }

    /// Builds a scale from breakpoints.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Policy`] unless there are exactly
    /// `RAMP_STEPS - 1` finite, strictly ascending breakpoints.
    pub fn new(filter: DiseaseFilter, breakpoints: Vec<f64>) -> Result<Self, MapError> {
        if breakpoints.len() != usize::from(RAMP_STEPS) - 1 {
            return Err(MapError::Policy {
                message: format!(
                    "{filter} scale needs {} breakpoints, got {}",
                    RAMP_STEPS - 1,
                    breakpoints.len()
                ),
            });
        }
        if breakpoints.iter().any(|b| !b.is_finite())
            || breakpoints.windows(2).any(|w| w[0] >= w[1])
        {
            return Err(MapError::Policy {
                message: format!("{filter} breakpoints must be finite and strictly ascending"),
            });
        }
        Ok(Self {
            filter,
            breakpoints,
        })
    }

    /// Returns the compile-time embedded scale for `filter`.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed or missing. The tables are
    /// compile-time constants, so a failure here is a development error
    /// caught by tests.
    #[must_use]
    pub fn embedded(filter: DiseaseFilter) -> Self {
        let toml_str = SCALE_TOMLS
            .iter()
            .find(|(f, _)| *f == filter)
            .map(|(_, toml_str)| *toml_str)
            .unwrap_or_else(|| panic!("No embedded rate scale for {filter}"));

        let scale = Self::from_toml(toml_str)
            .unwrap_or_else(|e| panic!("Failed to load embedded {filter} rate scale: {e}"));
        assert_eq!(scale.filter, filter, "{filter} scale file names another filter");
        scale
    }

    /// Filter this scale applies to.
    #[must_use]
    pub const fn filter(&self) -> DiseaseFilter {
        self.filter
    }

    /// Breakpoints, ascending.
    #[must_use]
    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    /// Step color for a rate. A missing or non-finite rate is gray.
    #[must_use]
    pub fn color(&self, rate: Option<f64>) -> ColorToken {
        let Some(rate) = rate.filter(|r| r.is_finite()) else {
            return ColorToken::Gray;
        };
        let step = self.breakpoints.iter().filter(|b| rate >= **b).count();
        ColorToken::Ramp(u8::try_from(step).unwrap_or(RAMP_STEPS - 1))
    }

    /// Legend entries, lowest step first, followed by the no-data entry.
    #[must_use]
    pub fn legend(&self) -> Vec<LegendEntry> {
        let mut entries = Vec::with_capacity(self.breakpoints.len() + 2);
        let mut lower: Option<f64> = None;

        for (step, upper) in (0u8..).zip(&self.breakpoints) {
            let label = lower.map_or_else(|| format!("< {upper}"), |lower| format!("{lower}-{upper}"));
            entries.push(LegendEntry {
                label,
                color: ColorToken::Ramp(step),
            });
            lower = Some(*upper);
        }
        if let Some(last) = lower {
            entries.push(LegendEntry {
                label: format!(">= {last}"),
                color: ColorToken::Ramp(RAMP_STEPS - 1),
            });
        }
        entries.push(LegendEntry {
            label: "no data".to_string(),
            color: ColorToken::Gray,
        });
        entries
    }
}
