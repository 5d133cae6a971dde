#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location catalog.
//!
//! Loads the selectable locations once and serves them in a deterministic
//! display order. The catalog never retries on its own: when the backend is
//! unreachable the caller gets [`CatalogError::UpstreamUnavailable`] and may
//! call [`LocationCatalog::load`] again on user action.

use health_map_location_models::{Location, LocationId, LocationKind};
use health_map_source::DashboardSource;

/// Errors that can occur when loading or querying the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The location backend could not be reached or answered garbage.
    #[error("Location catalog unavailable: {reason}")]
    UpstreamUnavailable {
        /// Underlying failure.
        reason: String,
    },

    /// No location has the requested id.
    #[error("Location {id} not found")]
    NotFound {
        /// The id that was looked up.
        id: LocationId,
    },
}

/// The loaded, ordered set of selectable locations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationCatalog {
    locations: Vec<Location>,
}

impl LocationCatalog {
    /// Fetches the location list from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UpstreamUnavailable`] if the fetch fails for
    /// any reason.
    pub async fn load(source: &dyn DashboardSource) -> Result<Self, CatalogError> {
        let locations = source.locations().await.map_err(|e| {
            log::warn!("Failed to load locations: {e}");
            CatalogError::UpstreamUnavailable {
                reason: e.to_string(),
            }
        })?;

        let catalog = Self::from_locations(locations);
        log::info!("Loaded {} locations", catalog.len());
        Ok(catalog)
    }

    /// Builds a catalog from already-fetched locations.
    ///
    /// Locations are sorted by name (case-insensitive), ties by id. When an
    /// id appears more than once only its first occurrence is kept.
    #[must_use]
    pub fn from_locations(locations: Vec<Location>) -> Self {
        let mut seen = std::collections::BTreeSet::new();
        let mut locations: Vec<Location> = locations
            .into_iter()
            .filter(|location| {
                let fresh = seen.insert(location.id);
                if !fresh {
                    log::warn!("Dropping duplicate location id {}", location.id);
                }
                fresh
            })
            .collect();

        locations.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });

        Self { locations }
    }

    /// All locations in display order.
    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Number of locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Looks up a location by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no location has `id`.
    pub fn find_by_id(&self, id: LocationId) -> Result<&Location, CatalogError> {
        self.locations
            .iter()
            .find(|location| location.id == id)
            .ok_or(CatalogError::NotFound { id })
    }

    /// Looks up a location by display name, ignoring case, punctuation and
    /// extra whitespace.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Location> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }
        self.locations
            .iter()
            .find(|location| normalize_name(&location.name) == wanted)
    }

    /// Locations of one administrative kind, in display order.
    pub fn of_kind(&self, kind: LocationKind) -> impl Iterator<Item = &Location> {
        self.locations
            .iter()
            .filter(move |location| location.kind == kind)
    }
}

/// Normalizes a place name for matching: lowercase, `&` read as `and`,
/// punctuation dropped, whitespace collapsed.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.replace('&', " and ")
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
