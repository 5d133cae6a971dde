#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard data source trait and payload decoding.
//!
//! Every backend the dashboard can talk to implements [`DashboardSource`].
//! [`http::HttpSource`] talks to the prediction REST API;
//! [`memory::MemorySource`] serves canned data for demos and tests.
//!
//! Sources never retry. A failed fetch is reported once and the caller
//! decides whether the user should try again.

pub mod decode;
pub mod fetch;
pub mod http;
pub mod memory;

use async_trait::async_trait;
use health_map_alert_models::Alert;
use health_map_location_models::{Location, LocationId};
use health_map_source_models::{ResourcePrediction, RiskPrediction};

/// Errors that can occur while fetching or decoding dashboard data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error detail reported by the backend.
        message: String,
    },

    /// Valid JSON that does not match the expected payload shape.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of what went wrong.
        message: String,
    },
}

impl SourceError {
    /// HTTP status of the failure, when the backend produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Json(_) | Self::Decode { .. } => None,
        }
    }
}

/// Trait that every dashboard data backend implements.
///
/// Implementations must be cheap to share across tasks; the dashboard holds
/// one behind an `Arc` and issues fetches from spawned tasks.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    /// Returns every selectable location.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the backend is unreachable or the payload
    /// cannot be decoded.
    async fn locations(&self) -> Result<Vec<Location>, SourceError>;

    /// Returns the latest disease risk prediction for a location.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the backend is unreachable or the payload
    /// cannot be decoded.
    async fn risk_prediction(&self, id: LocationId) -> Result<RiskPrediction, SourceError>;

    /// Returns the latest resource prediction for a location.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the backend is unreachable or the payload
    /// cannot be decoded.
    async fn resource_prediction(&self, id: LocationId)
    -> Result<ResourcePrediction, SourceError>;

    /// Returns the current alerts at or above `threshold` probability.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the backend is unreachable or the payload
    /// cannot be decoded.
    async fn alerts(&self, threshold: f64) -> Result<Vec<Alert>, SourceError>;
}
