//! Detail panel state.
//!
//! The panel has one section per fetch. Each section carries its own
//! loading and error state, so a failed risk fetch never hides loaded
//! resource data and vice versa.

use health_map_location_models::Location;
use health_map_resource_models::{Recommendation, ResourceGap};
use health_map_risk_models::{DiseaseRiskRecord, OverallRisk};
use health_map_source_models::FetchFailure;
use serde::{Deserialize, Serialize};

/// Lifecycle of one panel section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SectionState<T> {
    /// Nothing requested, or the error was dismissed.
    Idle,
    /// A fetch for the current selection is in flight.
    Loading,
    /// Data for the current selection.
    Loaded(T),
    /// The fetch for the current selection failed.
    Failed(FetchFailure),
}

impl<T> Default for SectionState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> SectionState<T> {
    /// Whether a fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Loaded data, if any.
    #[must_use]
    pub const fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// The section error, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&FetchFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Risk section of the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSection {
    /// Per-disease records, in [`health_map_risk_models::Disease`] order.
    pub records: Vec<DiseaseRiskRecord>,
    /// Worst-case aggregate.
    pub overall: OverallRisk,
    /// Overall per-100k case rate, when known.
    pub overall_rate: Option<f64>,
    /// Climate inputs behind the prediction.
    pub climate_snapshot: serde_json::Value,
}

/// Resource section of the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSection {
    /// Gap of every tracked category.
    pub gaps: Vec<ResourceGap>,
    /// Non-sufficient gaps with messages. Empty when fully covered.
    pub recommendations: Vec<Recommendation>,
}

/// Everything shown for the selected location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailPanel {
    /// Selected location.
    pub location: Option<Location>,
    /// Risk section.
    pub risk: SectionState<RiskSection>,
    /// Resource section.
    pub resources: SectionState<ResourceSection>,
}

impl DetailPanel {
    /// Whether either section is still waiting on a fetch.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.risk.is_loading() || self.resources.is_loading()
    }
}
