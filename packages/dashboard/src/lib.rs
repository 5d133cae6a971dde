#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard core.
//!
//! The [`SelectionCoordinator`] owns the current location selection and the
//! detail panel built from it. Selecting a location issues a risk fetch and
//! a resource fetch tagged with the selection's epoch; results are applied
//! only while their epoch is still current, so a slow response for an old
//! selection can never overwrite a newer one.

pub mod coordinator;
pub mod panel;

use health_map_location::CatalogError;
use health_map_location_models::LocationId;
use health_map_resource::ResourceError;
use health_map_source_models::FetchFailure;
use serde::{Deserialize, Serialize};

pub use coordinator::{Applied, FetchOutcome, FetchResult, SelectionCoordinator};
pub use panel::{DetailPanel, ResourceSection, RiskSection, SectionState};

/// Errors surfaced by the dashboard.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    /// The requested selection is missing, not numeric, or names no
    /// known location. Prior state is left untouched.
    #[error("Invalid selection '{input}': {reason}")]
    InvalidSelection {
        /// Raw input as received.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Resource data could not be turned into gaps (negative counts).
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The location backend could not be reached.
    #[error("Upstream unavailable: {reason}")]
    UpstreamUnavailable {
        /// Underlying failure.
        reason: String,
    },

    /// A section fetch failed.
    #[error("{0}")]
    FetchFailed(FetchFailure),

    /// No location has the requested id.
    #[error("Location {id} not found")]
    NotFound {
        /// The id that was looked up.
        id: LocationId,
    },
}

impl From<CatalogError> for DashboardError {
    fn from(value: CatalogError) -> Self {
        match value {
            CatalogError::UpstreamUnavailable { reason } => Self::UpstreamUnavailable { reason },
            CatalogError::NotFound { id } => Self::NotFound { id },
        }
    }
}

impl From<FetchFailure> for DashboardError {
    fn from(value: FetchFailure) -> Self {
        Self::FetchFailed(value)
    }
}

/// The current selection. Only the coordinator mutates it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    active_location_id: Option<LocationId>,
    request_epoch: u64,
}

impl Selection {
    /// Currently selected location, if any.
    #[must_use]
    pub const fn active_location_id(&self) -> Option<LocationId> {
        self.active_location_id
    }

    /// Epoch of the latest selection. Increments on every selection.
    #[must_use]
    pub const fn request_epoch(&self) -> u64 {
        self.request_epoch
    }

    /// Moves to `id`, returning the new epoch.
    const fn advance(&mut self, id: LocationId) -> u64 {
        self.request_epoch += 1;
        self.active_location_id = Some(id);
        self.request_epoch
    }

    /// Whether a result tagged with `epoch` may still be applied.
    #[must_use]
    pub const fn is_current(&self, epoch: u64) -> bool {
        self.request_epoch == epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_epochs_increase() {
        let mut selection = Selection::default();
        assert_eq!(selection.active_location_id(), None);
        assert_eq!(selection.advance(4), 1);
        assert_eq!(selection.advance(4), 2);
        assert!(selection.is_current(2));
        assert!(!selection.is_current(1));
        assert_eq!(selection.active_location_id(), Some(4));
    }

    #[test]
    fn catalog_errors_map_onto_dashboard_errors() {
        assert_eq!(
            DashboardError::from(CatalogError::NotFound { id: 3 }),
            DashboardError::NotFound { id: 3 }
        );
        assert!(matches!(
            DashboardError::from(CatalogError::UpstreamUnavailable {
                reason: "down".to_string()
            }),
            DashboardError::UpstreamUnavailable { .. }
        ));
    }
}
