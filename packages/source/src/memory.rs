//! In-memory [`DashboardSource`] for demos and tests.
//!
//! Data is inserted up front; any fetch category can be switched into a
//! failing state to exercise section-scoped error handling.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use health_map_alert_models::Alert;
use health_map_location_models::{Location, LocationId};
use health_map_source_models::{FetchCategory, ResourcePrediction, RiskPrediction};

use crate::{DashboardSource, SourceError};

/// HTTP status reported for injected failures.
const INJECTED_FAILURE_STATUS: u16 = 503;

#[derive(Debug, Default)]
struct MemoryData {
    locations: Vec<Location>,
    risk: BTreeMap<LocationId, RiskPrediction>,
    resources: BTreeMap<LocationId, ResourcePrediction>,
    alerts: Vec<Alert>,
    failures: BTreeMap<FetchCategory, String>,
}

/// A [`DashboardSource`] serving data held in memory.
#[derive(Debug, Default)]
pub struct MemorySource {
    data: RwLock<MemoryData>,
}

impl MemorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MemoryData> {
        self.data
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MemoryData> {
        self.data
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Replaces the location list.
    #[must_use]
    pub fn with_locations(self, locations: Vec<Location>) -> Self {
        self.write().locations = locations;
        self
    }

    /// Sets the risk prediction served for `id`.
    #[must_use]
    pub fn with_risk(self, id: LocationId, prediction: RiskPrediction) -> Self {
        self.write().risk.insert(id, prediction);
        self
    }

    /// Sets the resource prediction served for `id`.
    #[must_use]
    pub fn with_resources(self, id: LocationId, prediction: ResourcePrediction) -> Self {
        self.write().resources.insert(id, prediction);
        self
    }

    /// Replaces the alert list.
    #[must_use]
    pub fn with_alerts(self, alerts: Vec<Alert>) -> Self {
        self.write().alerts = alerts;
        self
    }

    /// Makes every fetch of `category` fail with `reason` until
    /// [`Self::recover`] is called.
    pub fn fail(&self, category: FetchCategory, reason: impl Into<String>) {
        self.write().failures.insert(category, reason.into());
    }

    /// Clears an injected failure.
    pub fn recover(&self, category: FetchCategory) {
        self.write().failures.remove(&category);
    }

    /// Replaces the alert list in place.
    pub fn set_alerts(&self, alerts: Vec<Alert>) {
        self.write().alerts = alerts;
    }

    fn check(&self, category: FetchCategory) -> Result<(), SourceError> {
        match self.read().failures.get(&category) {
            Some(reason) => Err(SourceError::Status {
                status: INJECTED_FAILURE_STATUS,
                message: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn not_found(id: LocationId) -> SourceError {
    SourceError::Status {
        status: 404,
        message: format!("Location with ID {id} not found"),
    }
}

#[async_trait]
impl DashboardSource for MemorySource {
    async fn locations(&self) -> Result<Vec<Location>, SourceError> {
        self.check(FetchCategory::Locations)?;
        Ok(self.read().locations.clone())
    }

    async fn risk_prediction(&self, id: LocationId) -> Result<RiskPrediction, SourceError> {
        self.check(FetchCategory::Risk)?;
        self.read().risk.get(&id).cloned().ok_or_else(|| not_found(id))
    }

    async fn resource_prediction(
        &self,
        id: LocationId,
    ) -> Result<ResourcePrediction, SourceError> {
        self.check(FetchCategory::Resources)?;
        self.read()
            .resources
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn alerts(&self, threshold: f64) -> Result<Vec<Alert>, SourceError> {
        self.check(FetchCategory::Alerts)?;
        Ok(self
            .read()
            .alerts
            .iter()
            .filter(|alert| alert.probability >= threshold)
            .cloned()
            .collect())
    }
}
