#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Alert feed.
//!
//! [`filter`] scopes a raw alert list to one viewer. [`AlertFeed`] owns the
//! current list and replaces it on every refresh; [`spawn_periodic_refresh`]
//! does the same on a timer and publishes each result over a
//! [`tokio::sync::watch`] channel. Alerts are never kept past the fetch
//! cycle that produced them, so a failed refresh leaves the feed empty.

use std::sync::Arc;
use std::time::Duration;

use health_map_alert_models::{Alert, Viewer};
use health_map_source::DashboardSource;
use health_map_source_models::{FetchCategory, FetchFailure};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Default probability threshold, matching the backend's default.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Keeps the alerts `viewer` may see with `probability >= threshold`.
///
/// Administrators see every location. Other viewers see only alerts for
/// their own location, and nothing when they have none. Input order is
/// preserved.
#[must_use]
pub fn filter(alerts: &[Alert], threshold: f64, viewer: &Viewer) -> Vec<Alert> {
    if !viewer.role.is_administrative() && viewer.location_id.is_none() {
        log::debug!("Viewer {} has no location; no alerts visible", viewer.role);
        return Vec::new();
    }

    alerts
        .iter()
        .filter(|alert| alert.probability >= threshold)
        .filter(|alert| {
            viewer.role.is_administrative() || viewer.location_id == Some(alert.location_id)
        })
        .cloned()
        .collect()
}

/// State published by [`spawn_periodic_refresh`].
#[derive(Debug, Clone, PartialEq)]
pub enum AlertSnapshot {
    /// No refresh has completed yet.
    Pending,
    /// The latest refresh succeeded.
    Ready(Vec<Alert>),
    /// The latest refresh failed.
    Failed(FetchFailure),
}

impl AlertSnapshot {
    /// Alerts in this snapshot; empty unless [`AlertSnapshot::Ready`].
    #[must_use]
    pub fn alerts(&self) -> &[Alert] {
        match self {
            Self::Ready(alerts) => alerts,
            Self::Pending | Self::Failed(_) => &[],
        }
    }
}

async fn fetch(source: &dyn DashboardSource, threshold: f64) -> Result<Vec<Alert>, FetchFailure> {
    source.alerts(threshold).await.map_err(|e| {
        log::warn!("Alert refresh failed: {e}");
        FetchFailure::new(FetchCategory::Alerts, e.to_string())
    })
}

/// The current alert list and its section error.
pub struct AlertFeed {
    source: Arc<dyn DashboardSource>,
    threshold: f64,
    alerts: Vec<Alert>,
    error: Option<FetchFailure>,
}

impl std::fmt::Debug for AlertFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertFeed")
            .field("threshold", &self.threshold)
            .field("alerts", &self.alerts)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl AlertFeed {
    /// Creates an empty feed. Nothing is fetched until [`Self::refresh`].
    #[must_use]
    pub fn new(source: Arc<dyn DashboardSource>, threshold: f64) -> Self {
        Self {
            source,
            threshold,
            alerts: Vec::new(),
            error: None,
        }
    }

    /// Threshold sent to the backend and applied by [`Self::visible`].
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Fetches the alert list, replacing the current one.
    ///
    /// On failure the list is cleared and the failure is kept as the
    /// feed's section error until the next refresh or
    /// [`Self::dismiss_error`].
    ///
    /// # Errors
    ///
    /// Returns the [`FetchFailure`] if the fetch fails.
    pub async fn refresh(&mut self) -> Result<usize, FetchFailure> {
        match fetch(self.source.as_ref(), self.threshold).await {
            Ok(alerts) => {
                log::debug!("Alert feed refreshed: {} alerts", alerts.len());
                self.alerts = alerts;
                self.error = None;
                Ok(self.alerts.len())
            }
            Err(failure) => {
                self.alerts.clear();
                self.error = Some(failure.clone());
                Err(failure)
            }
        }
    }

    /// Every alert from the last successful refresh.
    #[must_use]
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// Alerts `viewer` may see.
    #[must_use]
    pub fn visible(&self, viewer: &Viewer) -> Vec<Alert> {
        filter(&self.alerts, self.threshold, viewer)
    }

    /// The failure of the last refresh, if it failed.
    #[must_use]
    pub const fn error(&self) -> Option<&FetchFailure> {
        self.error.as_ref()
    }

    /// Clears the section error.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

/// Refreshes alerts every `period` on a background task.
///
/// The first refresh runs immediately. The task stops once every receiver
/// has been dropped.
#[must_use]
pub fn spawn_periodic_refresh(
    source: Arc<dyn DashboardSource>,
    threshold: f64,
    period: Duration,
) -> (watch::Receiver<AlertSnapshot>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(AlertSnapshot::Pending);

    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let snapshot = match fetch(source.as_ref(), threshold).await {
                Ok(alerts) => AlertSnapshot::Ready(alerts),
                Err(failure) => AlertSnapshot::Failed(failure),
            };
            if tx.send(snapshot).is_err() {
                log::debug!("Alert refresh stopped: no receivers left");
                break;
            }
        }
    });

    (rx, handle)
}

#[cfg(test)]
mod tests {
    use health_map_alert_models::ViewerRole;
    use health_map_risk_models::RiskLevel;
    use health_map_source::memory::MemorySource;

    use super::*;

    fn alert(location_id: i64, probability: f64) -> Alert {
        Alert {
            location_id,
            location_name: None,
            disease: "dengue".to_string(),
            risk_level: RiskLevel::High,
            probability,
            message: format!("High risk of dengue at {location_id}"),
            date: None,
        }
    }

    #[test]
    fn clinician_sees_only_own_qualifying_alerts() {
        let alerts = [alert(3, 0.9), alert(7, 0.8), alert(7, 0.6), alert(9, 0.95)];
        let visible = filter(&alerts, 0.7, &Viewer::clinician(7));
        assert_eq!(visible, vec![alert(7, 0.8)]);
    }

    #[test]
    fn clinician_sees_every_qualifying_alert_for_their_location() {
        let alerts = [alert(3, 0.9), alert(7, 0.7), alert(7, 0.85), alert(9, 0.95)];
        let visible = filter(&alerts, 0.7, &Viewer::clinician(7));
        assert_eq!(visible, vec![alert(7, 0.7), alert(7, 0.85)]);
    }

    #[tokio::test]
    async fn refresh_picks_up_replaced_alerts() {
        let source = Arc::new(MemorySource::new().with_alerts(vec![alert(7, 0.9)]));
        let mut feed = AlertFeed::new(source.clone(), DEFAULT_THRESHOLD);
        assert_eq!(feed.refresh().await.unwrap(), 1);

        source.set_alerts(vec![alert(3, 0.8), alert(9, 0.5), alert(9, 0.75)]);
        assert_eq!(feed.refresh().await.unwrap(), 2);
        let ids: Vec<_> = feed.alerts().iter().map(|a| a.location_id).collect();
        assert_eq!(ids, vec![3, 9]);
    }

    #[test]
    fn admin_sees_all_qualifying_alerts_in_order() {
        let alerts = [alert(3, 0.9), alert(7, 0.8), alert(7, 0.6), alert(9, 0.7)];
        let visible = filter(&alerts, 0.7, &Viewer::admin());
        let ids: Vec<_> = visible.iter().map(|a| a.location_id).collect();
        assert_eq!(ids, vec![3, 7, 9]);
    }

    #[test]
    fn clinician_without_location_sees_nothing() {
        let viewer = Viewer {
            role: ViewerRole::Hospital,
            location_id: None,
        };
        assert!(filter(&[alert(7, 0.99)], 0.7, &viewer).is_empty());
    }

    #[tokio::test]
    async fn failed_refresh_clears_alerts() {
        let source = Arc::new(MemorySource::new().with_alerts(vec![alert(7, 0.9)]));
        let mut feed = AlertFeed::new(source.clone(), DEFAULT_THRESHOLD);

        assert_eq!(feed.refresh().await.unwrap(), 1);
        assert_eq!(feed.visible(&Viewer::clinician(7)).len(), 1);

        source.fail(FetchCategory::Alerts, "gateway timeout");
        let failure = feed.refresh().await.unwrap_err();
        assert_eq!(failure.category, FetchCategory::Alerts);
        assert!(feed.alerts().is_empty());
        assert!(feed.error().is_some());

        feed.dismiss_error();
        assert!(feed.error().is_none());
    }

    #[tokio::test]
    async fn periodic_refresh_publishes_snapshots() {
        let source = Arc::new(MemorySource::new().with_alerts(vec![alert(3, 0.9)]));
        let (mut rx, handle) =
            spawn_periodic_refresh(source.clone(), DEFAULT_THRESHOLD, Duration::from_millis(10));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().alerts().len(), 1);

        source.fail(FetchCategory::Alerts, "down");
        loop {
            rx.changed().await.unwrap();
            if matches!(*rx.borrow_and_update(), AlertSnapshot::Failed(_)) {
                break;
            }
        }

        drop(rx);
        handle.await.unwrap();
    }
}
