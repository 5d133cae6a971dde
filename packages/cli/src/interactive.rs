//! Menu-driven dashboard using `dialoguer`.
//!
//! Holds one [`SelectionCoordinator`] and one [`AlertFeed`] for the whole
//! session, so switching locations goes through the same epoch-checked
//! selection path as any other client.

use std::sync::Arc;

use dialoguer::{Input, Select};
use health_map_alert::{AlertFeed, DEFAULT_THRESHOLD};
use health_map_alert_models::{Viewer, ViewerRole};
use health_map_dashboard::SelectionCoordinator;
use health_map_map::{DiseaseFilter, MetricMode};
use health_map_source::DashboardSource;
use health_map_source_models::FetchCategory;

use crate::display;

/// Top-level actions in the dashboard menu.
enum DashboardAction {
    Browse,
    Show,
    Filter,
    Alerts,
    Quit,
}

impl DashboardAction {
    const ALL: &[Self] = &[
        Self::Browse,
        Self::Show,
        Self::Filter,
        Self::Alerts,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Browse => "Browse locations",
            Self::Show => "Show a location",
            Self::Filter => "Change map filter",
            Self::Alerts => "View outbreak alerts",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the interactive dashboard until the user quits.
///
/// # Errors
///
/// Returns an error if the location catalog cannot be loaded or a prompt
/// fails.
pub async fn run(source: Arc<dyn DashboardSource>) -> Result<(), Box<dyn std::error::Error>> {
    let mut coordinator = SelectionCoordinator::load(Arc::clone(&source)).await?;
    let mut feed = AlertFeed::new(source, DEFAULT_THRESHOLD);
    let mut mode = MetricMode::RiskLevel;

    println!("{} location(s) loaded.", coordinator.catalog().len());

    let labels: Vec<&str> = DashboardAction::ALL
        .iter()
        .map(DashboardAction::label)
        .collect();

    loop {
        let idx = Select::new()
            .with_prompt("Health map")
            .items(&labels)
            .default(0)
            .interact()?;

        match DashboardAction::ALL[idx] {
            DashboardAction::Browse => {
                print!("{}", display::format_locations(coordinator.catalog().locations()));
            }
            DashboardAction::Show => handle_show(&mut coordinator, mode).await?,
            DashboardAction::Filter => mode = handle_filter(&mut coordinator)?,
            DashboardAction::Alerts => handle_alerts(&mut feed).await?,
            DashboardAction::Quit => break,
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Picks a location by name or id and shows its panel.
async fn handle_show(
    coordinator: &mut SelectionCoordinator,
    mode: MetricMode,
) -> Result<(), Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt("Location name or id")
        .interact_text()?;

    let by_name = coordinator
        .catalog()
        .find_by_name(&input)
        .map(|location| location.id.to_string());
    let raw = by_name.unwrap_or(input);

    if let Err(e) = coordinator.select_input(Some(&raw)) {
        println!("{e}");
        return Ok(());
    }

    if let Err(e) = coordinator.settle().await {
        log::warn!("{e}");
    }

    let color = coordinator
        .selection()
        .active_location_id()
        .map(|id| coordinator.map().color_for(id, mode));
    println!();
    print!("{}", display::format_panel(coordinator.panel(), color));

    for category in [FetchCategory::Risk, FetchCategory::Resources] {
        coordinator.dismiss_error(category);
    }

    Ok(())
}

/// Changes the map's disease filter and coloring mode, then prints the
/// legend.
fn handle_filter(
    coordinator: &mut SelectionCoordinator,
) -> Result<MetricMode, Box<dyn std::error::Error>> {
    let filters: Vec<String> = DiseaseFilter::all().iter().map(ToString::to_string).collect();
    let current = DiseaseFilter::all()
        .iter()
        .position(|filter| *filter == coordinator.map().filter())
        .unwrap_or(0);
    let idx = Select::new()
        .with_prompt("Disease")
        .items(&filters)
        .default(current)
        .interact()?;
    let filter = DiseaseFilter::all()[idx];
    coordinator.map_mut().set_filter(filter);

    let modes = [MetricMode::RiskLevel, MetricMode::Rate];
    let mode_labels = ["Risk level", "Cases per 100k"];
    let idx = Select::new()
        .with_prompt("Color by")
        .items(&mode_labels)
        .default(0)
        .interact()?;
    let mode = modes[idx];

    println!("\nLegend ({mode}, {filter}):");
    print!("{}", display::format_legend(&coordinator.map().legend(mode)));

    Ok(mode)
}

/// Refreshes alerts and lists the ones the chosen viewer may see.
async fn handle_alerts(feed: &mut AlertFeed) -> Result<(), Box<dyn std::error::Error>> {
    let roles: Vec<String> = ViewerRole::all().iter().map(ToString::to_string).collect();
    let idx = Select::new()
        .with_prompt("View as")
        .items(&roles)
        .default(0)
        .interact()?;
    let role = ViewerRole::all()[idx];

    let location_id = if role.is_administrative() {
        None
    } else {
        let id: String = Input::new()
            .with_prompt("Your location id")
            .interact_text()?;
        id.trim().parse().ok()
    };

    if let Err(e) = feed.refresh().await {
        println!("{e}");
        feed.dismiss_error();
        return Ok(());
    }

    let viewer = Viewer { role, location_id };
    print!("{}", display::format_alerts(&feed.visible(&viewer)));
    Ok(())
}
