#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Selectable location types.
//!
//! A [`Location`] is the unit every other part of the dashboard keys on:
//! risk predictions, resource predictions, alerts and map regions all
//! refer back to a location by its stable [`LocationId`].

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Stable, unique identifier of a location as assigned by the backend.
pub type LocationId = i64;

/// Administrative kind of a location.
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
pub enum LocationKind {
    /// A state.
    State,
    /// A union territory.
    UnionTerritory,
    /// A district within a state.
    District,
}

impl LocationKind {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::State, Self::UnionTerritory, Self::District]
    }
}

/// A selectable location. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Backend primary key.
    pub id: LocationId,
    /// Display name (e.g. "Kerala").
    pub name: String,
    /// Administrative kind. The backend serves this as `type`.
    #[serde(alias = "type")]
    pub kind: LocationKind,
    /// Resident population.
    #[serde(default)]
    pub population: u64,
    /// Land area in square kilometres, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
}
