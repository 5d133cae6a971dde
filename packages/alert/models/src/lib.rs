#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Outbreak alert and viewer types.
//!
//! Alerts are transient: they are replaced wholesale on every refresh and
//! never cached across fetch cycles.

use chrono::NaiveDate;
use health_map_location_models::LocationId;
use health_map_risk_models::RiskLevel;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A high-risk outbreak alert for one location and disease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Location the alert is about.
    pub location_id: LocationId,
    /// Display name of the location, when the backend includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    /// Disease key (`dengue`, `malaria`, ... or `overall`).
    pub disease: String,
    /// Predicted risk level.
    pub risk_level: RiskLevel,
    /// Outbreak probability in `[0, 1]`.
    pub probability: f64,
    /// Human-readable alert text.
    pub message: String,
    /// Date of the climate snapshot the alert was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Role of the person looking at the dashboard.
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
pub enum ViewerRole {
    /// Administrator; sees alerts for every location.
    Admin,
    /// Hospital clinician; sees alerts for their own location only.
    #[serde(alias = "clinician")]
    #[strum(to_string = "hospital", serialize = "clinician")]
    Hospital,
}

impl ViewerRole {
    /// Whether this role sees alerts across all locations.
    #[must_use]
    pub const fn is_administrative(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Admin, Self::Hospital]
    }
}

/// Who is looking at the alert feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    /// Role of the viewer.
    pub role: ViewerRole,
    /// Location the viewer is attached to (hospital staff).
    pub location_id: Option<LocationId>,
}

impl Viewer {
    /// An administrator with no location attachment.
    #[must_use]
    pub const fn admin() -> Self {
        Self {
            role: ViewerRole::Admin,
            location_id: None,
        }
    }

    /// A clinician attached to `location_id`.
    #[must_use]
    pub const fn clinician(location_id: LocationId) -> Self {
        Self {
            role: ViewerRole::Hospital,
            location_id: Some(location_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_alert() {
        let alert: Alert = serde_json::from_value(serde_json::json!({
            "location_id": 7,
            "location_name": "Kerala",
            "date": "2024-07-01",
            "disease": "dengue",
            "risk_level": "critical",
            "probability": 0.91,
            "message": "Critical risk of dengue in Kerala"
        }))
        .unwrap();

        assert_eq!(alert.location_id, 7);
        assert_eq!(alert.risk_level, RiskLevel::Critical);
        assert_eq!(alert.date, NaiveDate::from_ymd_opt(2024, 7, 1));
    }

    #[test]
    fn optional_fields_may_be_missing() {
        let alert: Alert = serde_json::from_value(serde_json::json!({
            "location_id": 3,
            "disease": "malaria",
            "risk_level": "high",
            "probability": 0.72,
            "message": "High risk of malaria"
        }))
        .unwrap();

        assert_eq!(alert.location_name, None);
        assert_eq!(alert.date, None);
    }

    #[test]
    fn clinician_is_an_alias_for_hospital() {
        assert_eq!("clinician".parse::<ViewerRole>().unwrap(), ViewerRole::Hospital);
        assert_eq!("HOSPITAL".parse::<ViewerRole>().unwrap(), ViewerRole::Hospital);
        let role: ViewerRole = serde_json::from_value(serde_json::json!("clinician")).unwrap();
        assert_eq!(role, ViewerRole::Hospital);
        assert!(!role.is_administrative());
        assert!(ViewerRole::Admin.is_administrative());
    }
}
