#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Choropleth presentation of location risk.
//!
//! [`MapPresentation`] keeps the latest risk records per location and turns
//! them into [`ColorToken`]s under one [`MetricMode`]. A [`RenderPass`] is
//! built for exactly one mode, so risk-level and rate colors can never be
//! mixed on the same map. Region clicks are resolved back to location ids
//! through the catalog.

pub mod scale;

use std::collections::BTreeMap;

use health_map_location::{LocationCatalog, normalize_name};
use health_map_location_models::LocationId;
use health_map_risk_models::{Disease, DiseaseRiskRecord, OverallRisk, RiskLevel};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::scale::RateScale;

/// Number of steps in the sequential rate ramp.
pub const RAMP_STEPS: u8 = 5;

/// Hex colors of the sequential rate ramp, lightest first.
const RAMP_PALETTE: [&str; RAMP_STEPS as usize] =
    ["#ffffb2", "#fecc5c", "#fd8d3c", "#f03b20", "#bd0026"];

/// Default GeoJSON property holding a region's display name.
pub const DEFAULT_NAME_PROPERTY: &str = "name";

/// Errors raised while loading map configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// A color scale table is invalid.
    #[error("Map scale error: {message}")]
    Policy {
        /// Description of what went wrong.
        message: String,
    },
}

/// A renderer-agnostic color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorToken {
    /// No data.
    Gray,
    /// Low risk.
    Green,
    /// Medium risk.
    Yellow,
    /// High risk.
    Orange,
    /// Critical risk.
    Red,
    /// Step of the sequential rate ramp, `0` lightest.
    Ramp(u8),
}

impl ColorToken {
    /// CSS hex color for this token.
    #[must_use]
    pub fn hex(self) -> &'static str {
        match self {
            Self::Gray => "#9e9e9e",
            Self::Green => "#4caf50",
            Self::Yellow => "#ffeb3b",
            Self::Orange => "#ff9800",
            Self::Red => "#f44336",
            Self::Ramp(step) => RAMP_PALETTE[usize::from(step).min(RAMP_PALETTE.len() - 1)],
        }
    }
}

/// What the map colors encode.
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
pub enum MetricMode {
    /// Ordinal risk level.
    RiskLevel,
    /// Per-100k case rate.
    Rate,
}

/// Which disease feeds the map: the location's overall risk, or one disease.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DiseaseFilter {
    /// Worst case across all diseases.
    #[default]
    Overall,
    /// Dengue only.
    Dengue,
    /// Malaria only.
    Malaria,
    /// Heatstroke only.
    Heatstroke,
    /// Diarrhoeal disease only.
    Diarrhea,
}

impl DiseaseFilter {
    /// The single disease selected, or `None` for [`DiseaseFilter::Overall`].
    #[must_use]
    pub const fn disease(self) -> Option<Disease> {
        match self {
            Self::Overall => None,
            Self::Dengue => Some(Disease::Dengue),
            Self::Malaria => Some(Disease::Malaria),
            Self::Heatstroke => Some(Disease::Heatstroke),
            Self::Diarrhea => Some(Disease::Diarrhea),
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Overall,
            Self::Dengue,
            Self::Malaria,
            Self::Heatstroke,
            Self::Diarrhea,
        ]
    }
}

/// One legend row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    /// Text shown next to the swatch.
    pub label: String,
    /// Swatch color.
    pub color: ColorToken,
}

/// Colors for every catalog location under a single mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderPass {
    /// Mode every color in this pass was computed with.
    pub mode: MetricMode,
    /// Filter every color in this pass was computed with.
    pub filter: DiseaseFilter,
    /// Color per location id.
    pub colors: BTreeMap<LocationId, ColorToken>,
}

#[derive(Debug, Clone, PartialEq)]
struct RegionRisk {
    records: Vec<DiseaseRiskRecord>,
    overall: OverallRisk,
    overall_rate: Option<f64>,
}

/// Map state: known regions, their latest risk, and the active filter.
#[derive(Debug, Clone)]
pub struct MapPresentation {
    location_ids: Vec<LocationId>,
    names: BTreeMap<String, LocationId>,
    name_property: String,
    filter: DiseaseFilter,
    scales: BTreeMap<DiseaseFilter, RateScale>,
    regions: BTreeMap<LocationId, RegionRisk>,
}

impl MapPresentation {
    /// Creates a presentation covering every location in `catalog`.
    ///
    /// `name_property` is the GeoJSON feature property that holds a
    /// region's display name.
    #[must_use]
    pub fn new(catalog: &LocationCatalog, name_property: impl Into<String>) -> Self {
        let names = catalog
            .locations()
            .iter()
            .map(|location| (normalize_name(&location.name), location.id))
            .collect();

        let scales = DiseaseFilter::all()
            .iter()
            .map(|filter| (*filter, RateScale::embedded(*filter)))
            .collect();

        Self {
            location_ids: catalog.locations().iter().map(|l| l.id).collect(),
            names,
            name_property: name_property.into(),
            filter: DiseaseFilter::default(),
            scales,
            regions: BTreeMap::new(),
        }
    }

    /// Replaces the rate scale used for its filter.
    pub fn set_scale(&mut self, scale: RateScale) {
        self.scales.insert(scale.filter(), scale);
    }

    /// Active disease filter.
    #[must_use]
    pub const fn filter(&self) -> DiseaseFilter {
        self.filter
    }

    /// Changes the disease filter for subsequent colors and passes.
    pub fn set_filter(&mut self, filter: DiseaseFilter) {
        log::debug!("Map filter set to {filter}");
        self.filter = filter;
    }

    /// Stores the latest risk records for a location.
    ///
    /// `overall_rate` is the backend's overall burden when it reports one;
    /// otherwise the mean of the record rates is used.
    pub fn record_risk(
        &mut self,
        id: LocationId,
        records: &[DiseaseRiskRecord],
        overall_rate: Option<f64>,
    ) {
        let overall = health_map_risk::aggregate(records);
        let overall_rate = overall_rate
            .filter(|rate| rate.is_finite())
            .or_else(|| health_map_risk::overall_rate(records));

        self.regions.insert(
            id,
            RegionRisk {
                records: records.to_vec(),
                overall,
                overall_rate,
            },
        );
    }

    /// Forgets the risk of a location; it renders as gray again.
    pub fn clear_risk(&mut self, id: LocationId) {
        self.regions.remove(&id);
    }

    /// Risk level of a location under the active filter.
    #[must_use]
    pub fn level_for(&self, id: LocationId) -> RiskLevel {
        self.regions
            .get(&id)
            .map_or(RiskLevel::Unknown, |region| match self.filter.disease() {
                None => region.overall.level,
                Some(disease) => health_map_risk::disease_level(&region.records, disease),
            })
    }

    /// Per-100k rate of a location under the active filter.
    #[must_use]
    pub fn rate_for(&self, id: LocationId) -> Option<f64> {
        let region = self.regions.get(&id)?;
        match self.filter.disease() {
            None => region.overall_rate,
            Some(disease) => health_map_risk::disease_rate(&region.records, disease),
        }
    }

    /// Color of a location under `mode` and the active filter.
    #[must_use]
    pub fn color_for(&self, id: LocationId, mode: MetricMode) -> ColorToken {
        match mode {
            MetricMode::RiskLevel => scale::risk_color(self.level_for(id)),
            MetricMode::Rate => self
                .scales
                .get(&self.filter)
                .map_or(ColorToken::Gray, |scale| scale.color(self.rate_for(id))),
        }
    }

    /// Colors every catalog location under one mode.
    #[must_use]
    pub fn render(&self, mode: MetricMode) -> RenderPass {
        RenderPass {
            mode,
            filter: self.filter,
            colors: self
                .location_ids
                .iter()
                .map(|id| (*id, self.color_for(*id, mode)))
                .collect(),
        }
    }

    /// Legend for `mode` under the active filter.
    #[must_use]
    pub fn legend(&self, mode: MetricMode) -> Vec<LegendEntry> {
        match mode {
            MetricMode::RiskLevel => scale::risk_legend(),
            MetricMode::Rate => self
                .scales
                .get(&self.filter)
                .map(RateScale::legend)
                .unwrap_or_default(),
        }
    }

    /// Resolves a region display name to a location id.
    #[must_use]
    pub fn resolve_region_name(&self, name: &str) -> Option<LocationId> {
        self.names.get(&normalize_name(name)).copied()
    }

    /// Resolves a clicked GeoJSON feature to a location id.
    ///
    /// Reads the configured name property from `properties`. Returns `None`
    /// (a no-op click) when the property is missing or names no location.
    #[must_use]
    pub fn resolve_click(&self, feature: &serde_json::Value) -> Option<LocationId> {
        let name = feature
            .get("properties")?
            .get(&self.name_property)
            .and_then(serde_json::Value::as_str)?;

        let id = self.resolve_region_name(name);
        if id.is_none() {
            log::debug!("Click on region '{name}' matches no location");
        }
        id
    }
}
