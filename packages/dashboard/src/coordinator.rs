//! Selection coordination.
//!
//! Fetches run as spawned tasks and report back over an unbounded channel.
//! The coordinator is the only owner of the selection and applies outcomes
//! one at a time, so no lock guards selection state. An outcome whose epoch
//! is no longer current is discarded.

use std::sync::Arc;

use health_map_location::LocationCatalog;
use health_map_location_models::LocationId;
use health_map_map::{DEFAULT_NAME_PROPERTY, MapPresentation};
use health_map_resource::GapCalculator;
use health_map_source::DashboardSource;
use health_map_source_models::{
    FetchCategory, FetchFailure, ResourcePrediction, RiskPrediction,
};
use tokio::sync::mpsc;

use crate::panel::{DetailPanel, ResourceSection, RiskSection, SectionState};
use crate::{DashboardError, Selection};

/// Payload of a completed fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    /// Risk prediction fetch.
    Risk(Result<RiskPrediction, FetchFailure>),
    /// Resource prediction fetch.
    Resources(Result<ResourcePrediction, FetchFailure>),
}

impl FetchResult {
    /// Section this result belongs to.
    #[must_use]
    pub const fn category(&self) -> FetchCategory {
        match self {
            Self::Risk(_) => FetchCategory::Risk,
            Self::Resources(_) => FetchCategory::Resources,
        }
    }
}

/// A completed fetch, tagged with the epoch it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// Selection epoch at issue time.
    pub epoch: u64,
    /// Location the fetch was for.
    pub location_id: LocationId,
    /// What came back.
    pub result: FetchResult,
}

/// What [`SelectionCoordinator::apply`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The risk section was updated.
    Risk,
    /// The resource section was updated.
    Resources,
    /// The outcome belonged to an older selection and was dropped.
    Stale {
        /// Epoch the outcome was issued under.
        epoch: u64,
        /// Epoch current when it arrived.
        current: u64,
    },
}

/// Owns the selection, the detail panel and the map for one dashboard.
pub struct SelectionCoordinator {
    source: Arc<dyn DashboardSource>,
    catalog: LocationCatalog,
    calculator: GapCalculator,
    selection: Selection,
    panel: DetailPanel,
    map: MapPresentation,
    outcomes_tx: mpsc::UnboundedSender<FetchOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    in_flight: usize,
}

impl std::fmt::Debug for SelectionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionCoordinator")
            .field("catalog", &self.catalog.len())
            .field("selection", &self.selection)
            .field("panel", &self.panel)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl SelectionCoordinator {
    /// Creates a coordinator over an already loaded catalog.
    #[must_use]
    pub fn new(source: Arc<dyn DashboardSource>, catalog: LocationCatalog) -> Self {
        let map = MapPresentation::new(&catalog, DEFAULT_NAME_PROPERTY);
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();

        Self {
            source,
            catalog,
            calculator: GapCalculator::default(),
            selection: Selection::default(),
            panel: DetailPanel::default(),
            map,
            outcomes_tx,
            outcomes_rx,
            in_flight: 0,
        }
    }

    /// Loads the catalog from `source` and creates a coordinator over it.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::UpstreamUnavailable`] if the catalog cannot
    /// be loaded. Nothing is retried; the caller may try again.
    pub async fn load(source: Arc<dyn DashboardSource>) -> Result<Self, DashboardError> {
        let catalog = LocationCatalog::load(source.as_ref()).await?;
        Ok(Self::new(source, catalog))
    }

    /// Replaces the gap calculator (and with it the gap policy).
    #[must_use]
    pub fn with_calculator(mut self, calculator: GapCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    /// Replaces the map presentation, e.g. to read a different GeoJSON
    /// name property.
    #[must_use]
    pub fn with_map(mut self, map: MapPresentation) -> Self {
        self.map = map;
        self
    }

    /// The loaded catalog.
    #[must_use]
    pub const fn catalog(&self) -> &LocationCatalog {
        &self.catalog
    }

    /// The current selection.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The detail panel for the current selection.
    #[must_use]
    pub const fn panel(&self) -> &DetailPanel {
        &self.panel
    }

    /// The map presentation.
    #[must_use]
    pub const fn map(&self) -> &MapPresentation {
        &self.map
    }

    /// Mutable access to the map, for filter changes.
    pub const fn map_mut(&mut self) -> &mut MapPresentation {
        &mut self.map
    }

    /// Selects a location and issues its risk and resource fetches.
    ///
    /// Returns the epoch the fetches were tagged with.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::InvalidSelection`] if `id` is not in the
    /// catalog. The previous selection and panel are left untouched.
    pub fn select(&mut self, id: LocationId) -> Result<u64, DashboardError> {
        let location = self
            .catalog
            .find_by_id(id)
            .map_err(|e| DashboardError::InvalidSelection {
                input: id.to_string(),
                reason: e.to_string(),
            })?
            .clone();

        let epoch = self.selection.advance(id);
        log::info!("Selected {} ({id}), epoch {epoch}", location.name);

        self.panel = DetailPanel {
            location: Some(location),
            risk: SectionState::Loading,
            resources: SectionState::Loading,
        };

        self.spawn_risk(epoch, id);
        self.spawn_resources(epoch, id);

        Ok(epoch)
    }

    /// Selects from a raw UI value.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::InvalidSelection`] if the value is missing,
    /// blank or not a numeric id, or if [`Self::select`] rejects it.
    pub fn select_input(&mut self, input: Option<&str>) -> Result<u64, DashboardError> {
        let raw = input.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Err(DashboardError::InvalidSelection {
                input: raw.to_string(),
                reason: "no location selected".to_string(),
            });
        }

        let id: LocationId = raw.parse().map_err(|_| DashboardError::InvalidSelection {
            input: raw.to_string(),
            reason: "not a numeric location id".to_string(),
        })?;

        self.select(id)
    }

    /// Selects the location behind a clicked map feature.
    ///
    /// Returns `Ok(None)` when the feature matches no location.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::select`] errors.
    pub fn click_region(
        &mut self,
        feature: &serde_json::Value,
    ) -> Result<Option<u64>, DashboardError> {
        self.map
            .resolve_click(feature)
            .map(|id| self.select(id))
            .transpose()
    }

    fn spawn_risk(&mut self, epoch: u64, id: LocationId) {
        let source = Arc::clone(&self.source);
        let tx = self.outcomes_tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let result = source.risk_prediction(id).await.map_err(|e| {
                log::warn!("Risk fetch for {id} failed: {e}");
                FetchFailure::new(FetchCategory::Risk, e.to_string())
            });
            let _ = tx.send(FetchOutcome {
                epoch,
                location_id: id,
                result: FetchResult::Risk(result),
            });
        });
    }

    fn spawn_resources(&mut self, epoch: u64, id: LocationId) {
        let source = Arc::clone(&self.source);
        let tx = self.outcomes_tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let result = source.resource_prediction(id).await.map_err(|e| {
                log::warn!("Resource fetch for {id} failed: {e}");
                FetchFailure::new(FetchCategory::Resources, e.to_string())
            });
            let _ = tx.send(FetchOutcome {
                epoch,
                location_id: id,
                result: FetchResult::Resources(result),
            });
        });
    }

    /// Applies one completed fetch.
    ///
    /// Outcomes from older epochs are discarded. A fetch failure becomes the
    /// section's error without touching the other section. A failed risk
    /// fetch also drops the location's map risk, so it renders as no data.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Resource`] if the resource payload carries
    /// negative counts. The resource section is marked failed as well.
    pub fn apply(&mut self, outcome: FetchOutcome) -> Result<Applied, DashboardError> {
        let current = self.selection.request_epoch();
        if !self.selection.is_current(outcome.epoch) {
            log::debug!(
                "Discarding stale {} result for {} (epoch {} < {current})",
                outcome.result.category(),
                outcome.location_id,
                outcome.epoch,
            );
            return Ok(Applied::Stale {
                epoch: outcome.epoch,
                current,
            });
        }

        match outcome.result {
            FetchResult::Risk(result) => {
                self.panel.risk = match result {
                    Ok(prediction) => {
                        SectionState::Loaded(self.risk_section(outcome.location_id, prediction))
                    }
                    Err(failure) => {
                        self.map.clear_risk(outcome.location_id);
                        SectionState::Failed(failure)
                    }
                };
                Ok(Applied::Risk)
            }
            FetchResult::Resources(result) => {
                let prediction = match result {
                    Ok(prediction) => prediction,
                    Err(failure) => {
                        self.panel.resources = SectionState::Failed(failure);
                        return Ok(Applied::Resources);
                    }
                };

                match self.resource_section(&prediction) {
                    Ok(section) => {
                        self.panel.resources = SectionState::Loaded(section);
                        Ok(Applied::Resources)
                    }
                    Err(e) => {
                        log::warn!("Rejecting resource data for {}: {e}", outcome.location_id);
                        self.panel.resources = SectionState::Failed(FetchFailure::new(
                            FetchCategory::Resources,
                            e.to_string(),
                        ));
                        Err(e)
                    }
                }
            }
        }
    }

    fn risk_section(&mut self, id: LocationId, prediction: RiskPrediction) -> RiskSection {
        let mut records = prediction.disease_risks;
        records.sort_by_key(|record| record.disease);

        let overall = health_map_risk::aggregate(&records);
        let overall_rate = prediction
            .overall_rate
            .or_else(|| health_map_risk::overall_rate(&records));
        self.map.record_risk(id, &records, overall_rate);

        RiskSection {
            records,
            overall,
            overall_rate,
            climate_snapshot: prediction.climate_snapshot,
        }
    }

    fn resource_section(
        &self,
        prediction: &ResourcePrediction,
    ) -> Result<ResourceSection, DashboardError> {
        let snapshots =
            health_map_resource::snapshots_from_maps(&prediction.current, &prediction.predicted);
        let name = self
            .panel
            .location
            .as_ref()
            .map_or("this location", |location| location.name.as_str());

        Ok(ResourceSection {
            gaps: self.calculator.gaps(&snapshots)?,
            recommendations: self.calculator.recommendations(name, &snapshots)?,
        })
    }

    /// Waits for the next completed fetch and applies it.
    ///
    /// Returns `None` when no fetch is in flight.
    pub async fn next_update(&mut self) -> Option<Result<Applied, DashboardError>> {
        if self.in_flight == 0 {
            return None;
        }
        let outcome = self.outcomes_rx.recv().await?;
        self.in_flight -= 1;
        Some(self.apply(outcome))
    }

    /// Applies outcomes until neither section of the current selection is
    /// loading.
    ///
    /// Stale outcomes that arrive along the way are discarded as usual.
    ///
    /// # Errors
    ///
    /// Returns the first [`DashboardError`] raised while applying. The panel
    /// is still settled when this returns.
    pub async fn settle(&mut self) -> Result<(), DashboardError> {
        let mut first_error = None;

        while self.panel.is_loading() {
            match self.next_update().await {
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                None => break,
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Clears a section error. Categories without a panel section are
    /// ignored.
    pub fn dismiss_error(&mut self, category: FetchCategory) {
        match category {
            FetchCategory::Risk if self.panel.risk.failure().is_some() => {
                self.panel.risk = SectionState::Idle;
            }
            FetchCategory::Resources if self.panel.resources.failure().is_some() => {
                self.panel.resources = SectionState::Idle;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use health_map_alert_models::Alert;
    use health_map_location_models::{Location, LocationKind};
    use health_map_map::{ColorToken, MetricMode};
    use health_map_resource::policy::{GapBand, GapPolicy};
    use health_map_resource_models::{GapStatus, ResourceCategory};
    use health_map_risk_models::{Disease, DiseaseRiskRecord, RiskLevel};
    use health_map_source::SourceError;
    use health_map_source::memory::MemorySource;
    use tokio::sync::oneshot;

    use super::*;

    /// A fetch the test has not answered yet.
    enum Call {
        Risk(LocationId, oneshot::Sender<Result<RiskPrediction, SourceError>>),
        Resources(LocationId, oneshot::Sender<Result<ResourcePrediction, SourceError>>),
    }

    /// Source whose fetches block until the test answers them.
    struct GatedSource {
        locations: Vec<Location>,
        calls: mpsc::UnboundedSender<Call>,
    }

    fn closed() -> SourceError {
        SourceError::Decode {
            message: "test gate closed".to_string(),
        }
    }

    #[async_trait]
    impl DashboardSource for GatedSource {
        async fn locations(&self) -> Result<Vec<Location>, SourceError> {
            Ok(self.locations.clone())
        }

        async fn risk_prediction(&self, id: LocationId) -> Result<RiskPrediction, SourceError> {
            let (tx, rx) = oneshot::channel();
            self.calls.send(Call::Risk(id, tx)).map_err(|_| closed())?;
            rx.await.unwrap_or_else(|_| Err(closed()))
        }

        async fn resource_prediction(
            &self,
            id: LocationId,
        ) -> Result<ResourcePrediction, SourceError> {
            let (tx, rx) = oneshot::channel();
            self.calls.send(Call::Resources(id, tx)).map_err(|_| closed())?;
            rx.await.unwrap_or_else(|_| Err(closed()))
        }

        async fn alerts(&self, _threshold: f64) -> Result<Vec<Alert>, SourceError> {
            Ok(Vec::new())
        }
    }

    type RiskReply = oneshot::Sender<Result<RiskPrediction, SourceError>>;
    type ResourceReply = oneshot::Sender<Result<ResourcePrediction, SourceError>>;

    /// Receives the two fetches issued by one selection.
    async fn take_pair(
        calls: &mut mpsc::UnboundedReceiver<Call>,
        expected: LocationId,
    ) -> (RiskReply, ResourceReply) {
        let mut risk = None;
        let mut resources = None;
        while risk.is_none() || resources.is_none() {
            match calls.recv().await.unwrap() {
                Call::Risk(id, reply) => {
                    assert_eq!(id, expected);
                    risk = Some(reply);
                }
                Call::Resources(id, reply) => {
                    assert_eq!(id, expected);
                    resources = Some(reply);
                }
            }
        }
        (risk.unwrap(), resources.unwrap())
    }

    fn location(id: LocationId, name: &str) -> Location {
        Location {
            id,
            name: name.to_string(),
            kind: LocationKind::State,
            population: 1_000_000,
            area: None,
        }
    }

    fn setup() -> (SelectionCoordinator, mpsc::UnboundedReceiver<Call>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let locations = vec![location(1, "Kerala"), location(2, "Assam")];
        let catalog = LocationCatalog::from_locations(locations.clone());
        let source = Arc::new(GatedSource {
            locations,
            calls: tx,
        });
        (SelectionCoordinator::new(source, catalog), rx)
    }

    fn risk(level: RiskLevel) -> RiskPrediction {
        RiskPrediction {
            disease_risks: vec![DiseaseRiskRecord {
                disease: Disease::Dengue,
                probability: 0.5,
                risk_level: level,
                rate_per_100k: None,
            }],
            climate_snapshot: serde_json::Value::Null,
            overall_rate: None,
        }
    }

    fn resources(available: i64, predicted: i64) -> ResourcePrediction {
        ResourcePrediction {
            current: [("beds".to_string(), available)].into_iter().collect(),
            predicted: [("beds".to_string(), predicted)].into_iter().collect(),
        }
    }

    fn risk_level(coordinator: &SelectionCoordinator) -> Option<RiskLevel> {
        coordinator
            .panel()
            .risk
            .loaded()
            .map(|section| section.overall.level)
    }

    #[tokio::test]
    async fn late_response_for_old_selection_is_discarded() {
        let (mut coordinator, mut calls) = setup();

        coordinator.select(1).unwrap();
        let (risk_1, resources_1) = take_pair(&mut calls, 1).await;
        coordinator.select(2).unwrap();
        let (risk_2, resources_2) = take_pair(&mut calls, 2).await;

        risk_2.send(Ok(risk(RiskLevel::Medium))).unwrap();
        resources_2.send(Ok(resources(80, 100))).unwrap();
        coordinator.settle().await.unwrap();

        risk_1.send(Ok(risk(RiskLevel::Critical))).unwrap();
        resources_1.send(Ok(resources(10, 100))).unwrap();

        let mut stale = 0;
        while let Some(applied) = coordinator.next_update().await {
            assert!(matches!(
                applied.unwrap(),
                Applied::Stale { epoch: 1, current: 2 }
            ));
            stale += 1;
        }

        assert_eq!(stale, 2);
        assert_eq!(coordinator.selection().active_location_id(), Some(2));
        assert_eq!(coordinator.panel().location.as_ref().unwrap().id, 2);
        assert_eq!(risk_level(&coordinator), Some(RiskLevel::Medium));
        let gaps = &coordinator.panel().resources.loaded().unwrap().gaps;
        assert_eq!(gaps[0].status, GapStatus::Warning);
    }

    #[tokio::test]
    async fn reselecting_first_location_ignores_its_first_response() {
        let (mut coordinator, mut calls) = setup();

        coordinator.select(1).unwrap();
        let (old_risk, old_resources) = take_pair(&mut calls, 1).await;
        coordinator.select(2).unwrap();
        let (risk_2, resources_2) = take_pair(&mut calls, 2).await;
        let epoch = coordinator.select(1).unwrap();
        assert_eq!(epoch, 3);
        let (new_risk, new_resources) = take_pair(&mut calls, 1).await;

        new_risk.send(Ok(risk(RiskLevel::Low))).unwrap();
        new_resources.send(Ok(resources(100, 100))).unwrap();
        coordinator.settle().await.unwrap();
        assert_eq!(risk_level(&coordinator), Some(RiskLevel::Low));

        old_risk.send(Ok(risk(RiskLevel::Critical))).unwrap();
        old_resources.send(Ok(resources(0, 100))).unwrap();
        drop((risk_2, resources_2));

        while let Some(applied) = coordinator.next_update().await {
            assert!(matches!(applied.unwrap(), Applied::Stale { .. }));
        }

        assert_eq!(risk_level(&coordinator), Some(RiskLevel::Low));
        assert!(
            coordinator
                .panel()
                .resources
                .loaded()
                .unwrap()
                .recommendations
                .is_empty()
        );
    }

    #[tokio::test]
    async fn risk_failure_leaves_resources_visible() {
        let (mut coordinator, mut calls) = setup();

        coordinator.select(1).unwrap();
        let (risk_reply, resource_reply) = take_pair(&mut calls, 1).await;
        risk_reply
            .send(Err(SourceError::Status {
                status: 500,
                message: "model offline".to_string(),
            }))
            .unwrap();
        resource_reply.send(Ok(resources(50, 100))).unwrap();
        coordinator.settle().await.unwrap();

        let panel = coordinator.panel();
        let failure = panel.risk.failure().unwrap();
        assert_eq!(failure.category, FetchCategory::Risk);
        assert!(failure.reason.contains("model offline"));

        let section = panel.resources.loaded().unwrap();
        assert_eq!(section.gaps[0].status, GapStatus::Critical);
        assert_eq!(section.recommendations[0].category, ResourceCategory::Beds);
        assert_eq!(section.recommendations[0].message, "Need 50 more beds in Kerala");

        coordinator.dismiss_error(FetchCategory::Risk);
        assert_eq!(coordinator.panel().risk, SectionState::Idle);
        assert!(coordinator.panel().resources.loaded().is_some());
    }

    #[tokio::test]
    async fn resource_failure_leaves_risk_visible() {
        let (mut coordinator, mut calls) = setup();

        coordinator.select(2).unwrap();
        let (risk_reply, resource_reply) = take_pair(&mut calls, 2).await;
        drop(resource_reply);
        risk_reply.send(Ok(risk(RiskLevel::High))).unwrap();
        coordinator.settle().await.unwrap();

        assert_eq!(risk_level(&coordinator), Some(RiskLevel::High));
        assert_eq!(
            coordinator.panel().resources.failure().unwrap().category,
            FetchCategory::Resources
        );
        assert_eq!(
            coordinator.map().color_for(2, MetricMode::RiskLevel),
            ColorToken::Orange
        );
    }

    #[tokio::test]
    async fn negative_counts_fail_the_resource_section_only() {
        let (mut coordinator, mut calls) = setup();

        coordinator.select(1).unwrap();
        let (risk_reply, resource_reply) = take_pair(&mut calls, 1).await;
        resource_reply.send(Ok(resources(-5, 100))).unwrap();
        risk_reply.send(Ok(risk(RiskLevel::Low))).unwrap();

        let err = coordinator.settle().await.unwrap_err();
        assert!(matches!(err, DashboardError::Resource(_)));
        assert!(coordinator.panel().resources.failure().is_some());
        assert_eq!(risk_level(&coordinator), Some(RiskLevel::Low));
    }

    #[tokio::test]
    async fn invalid_input_leaves_state_untouched() {
        let (mut coordinator, mut calls) = setup();

        coordinator.select(1).unwrap();
        let (risk_reply, resource_reply) = take_pair(&mut calls, 1).await;
        risk_reply.send(Ok(risk(RiskLevel::High))).unwrap();
        resource_reply.send(Ok(resources(1, 1))).unwrap();
        coordinator.settle().await.unwrap();
        let before = coordinator.panel().clone();

        for input in [None, Some(""), Some("  "), Some("kerala"), Some("99")] {
            let err = coordinator.select_input(input).unwrap_err();
            assert!(matches!(err, DashboardError::InvalidSelection { .. }));
        }

        assert_eq!(coordinator.selection().request_epoch(), 1);
        assert_eq!(coordinator.panel(), &before);
        assert!(coordinator.next_update().await.is_none());
    }

    #[tokio::test]
    async fn numeric_input_and_region_clicks_select() {
        let (mut coordinator, mut calls) = setup();

        assert_eq!(coordinator.select_input(Some(" 2 ")).unwrap(), 1);
        let _pair = take_pair(&mut calls, 2).await;

        let feature = serde_json::json!({"properties": {"name": "kerala"}});
        assert_eq!(coordinator.click_region(&feature).unwrap(), Some(2));
        let _pair = take_pair(&mut calls, 1).await;

        let nowhere = serde_json::json!({"properties": {"name": "Atlantis"}});
        assert_eq!(coordinator.click_region(&nowhere).unwrap(), None);
        assert_eq!(coordinator.selection().active_location_id(), Some(1));
    }

    fn memory_source() -> Arc<MemorySource> {
        Arc::new(
            MemorySource::new()
                .with_locations(vec![location(1, "Kerala"), location(2, "Assam")])
                .with_risk(1, risk(RiskLevel::Critical))
                .with_resources(1, resources(60, 100)),
        )
    }

    #[tokio::test]
    async fn failed_risk_refetch_clears_map_color() {
        let source = memory_source();
        let mut coordinator = SelectionCoordinator::load(source.clone()).await.unwrap();

        coordinator.select(1).unwrap();
        coordinator.settle().await.unwrap();
        assert_eq!(
            coordinator.map().color_for(1, MetricMode::RiskLevel),
            ColorToken::Red
        );

        source.fail(FetchCategory::Risk, "model offline");
        coordinator.select(1).unwrap();
        coordinator.settle().await.unwrap();

        assert!(coordinator.panel().risk.failure().is_some());
        assert!(coordinator.panel().resources.loaded().is_some());
        assert_eq!(
            coordinator.map().color_for(1, MetricMode::RiskLevel),
            ColorToken::Gray
        );
    }

    #[tokio::test]
    async fn custom_gap_policy_drives_resource_section() {
        let policy = GapPolicy::from_bands(vec![
            GapBand {
                status: GapStatus::Sufficient,
                min_ratio: 50.0,
            },
            GapBand {
                status: GapStatus::Warning,
                min_ratio: 20.0,
            },
            GapBand {
                status: GapStatus::Critical,
                min_ratio: 0.0,
            },
        ])
        .unwrap();
        let mut coordinator = SelectionCoordinator::load(memory_source())
            .await
            .unwrap()
            .with_calculator(GapCalculator::new(policy));

        coordinator.select(1).unwrap();
        coordinator.settle().await.unwrap();

        let section = coordinator.panel().resources.loaded().unwrap();
        assert_eq!(section.gaps[0].status, GapStatus::Sufficient);
        assert!(section.recommendations.is_empty());
    }

    #[tokio::test]
    async fn custom_name_property_resolves_clicks() {
        let source = memory_source();
        let catalog = LocationCatalog::load(source.as_ref()).await.unwrap();
        let map = MapPresentation::new(&catalog, "NAME_1");
        let mut coordinator = SelectionCoordinator::new(source, catalog).with_map(map);

        let default_property = serde_json::json!({"properties": {"name": "Assam"}});
        assert_eq!(coordinator.click_region(&default_property).unwrap(), None);

        let feature = serde_json::json!({"properties": {"NAME_1": "Assam"}});
        assert_eq!(coordinator.click_region(&feature).unwrap(), Some(1));
        assert_eq!(coordinator.selection().active_location_id(), Some(2));
    }

    #[test]
    fn apply_is_epoch_checked() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let _guard = runtime.enter();
        let (mut coordinator, _calls) = setup();

        coordinator.select(1).unwrap();
        coordinator.select(2).unwrap();

        let stale = FetchOutcome {
            epoch: 1,
            location_id: 1,
            result: FetchResult::Risk(Ok(risk(RiskLevel::Critical))),
        };
        assert_eq!(
            coordinator.apply(stale).unwrap(),
            Applied::Stale {
                epoch: 1,
                current: 2
            }
        );
        assert!(coordinator.panel().risk.is_loading());

        let fresh = FetchOutcome {
            epoch: 2,
            location_id: 2,
            result: FetchResult::Risk(Ok(risk(RiskLevel::Medium))),
        };
        assert_eq!(coordinator.apply(fresh).unwrap(), Applied::Risk);
        assert_eq!(risk_level(&coordinator), Some(RiskLevel::Medium));
    }
}
