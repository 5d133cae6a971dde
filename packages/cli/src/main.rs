#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line dashboard for disease risk and hospital resource
//! predictions.
//!
//! ```text
//! health_map locations [--kind state]
//! health_map show <id> [--mode risk_level|rate] [--filter overall|dengue|...]
//! health_map alerts [--threshold 0.7] [--role admin|hospital] [--location <id>]
//! health_map alerts --watch 60
//! ```
//!
//! Running `health_map` with no subcommand enters interactive mode.
//!
//! The backend is configured through `HEALTH_MAP_API_URL`,
//! `HEALTH_MAP_API_TOKEN` and `HEALTH_MAP_TIMEOUT_SECS`.

mod display;
mod interactive;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use health_map_alert::{AlertFeed, AlertSnapshot, DEFAULT_THRESHOLD, spawn_periodic_refresh};
use health_map_alert_models::{Viewer, ViewerRole};
use health_map_dashboard::SelectionCoordinator;
use health_map_location::LocationCatalog;
use health_map_location_models::{LocationId, LocationKind};
use health_map_map::{DiseaseFilter, MetricMode};
use health_map_source::DashboardSource;
use health_map_source::http::{HttpSource, HttpSourceConfig};

#[derive(Parser)]
#[command(
    name = "health_map",
    about = "Disease risk and hospital resource dashboard"
)]
struct Cli {
    /// Override `HEALTH_MAP_API_URL`
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List selectable locations
    Locations {
        /// Only show one kind (state, union_territory, district)
        #[arg(long)]
        kind: Option<LocationKind>,
    },
    /// Show the risk and resource panel for a location
    Show {
        /// Location ID
        id: String,
        /// Map coloring mode
        #[arg(long, default_value = "risk_level")]
        mode: MetricMode,
        /// Disease feeding the map color
        #[arg(long, default_value = "overall")]
        filter: DiseaseFilter,
    },
    /// List current outbreak alerts
    Alerts {
        /// Minimum outbreak probability
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
        /// Viewer role (admin, hospital)
        #[arg(long, default_value = "admin")]
        role: ViewerRole,
        /// Viewer location (required to see anything as hospital staff)
        #[arg(long)]
        location: Option<LocationId>,
        /// Keep refreshing every N seconds
        #[arg(long)]
        watch: Option<u64>,
    },
}

fn build_source(api_url: Option<String>) -> Result<Arc<dyn DashboardSource>, Box<dyn std::error::Error>> {
    let mut config = HttpSourceConfig::from_env();
    if let Some(url) = api_url {
        config = config.with_base_url(url);
    }
    Ok(Arc::new(HttpSource::new(config)?))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let source = build_source(cli.api_url)?;

    let Some(command) = cli.command else {
        return interactive::run(source).await;
    };

    match command {
        Commands::Locations { kind } => {
            let catalog = LocationCatalog::load(source.as_ref()).await?;
            let text = match kind {
                Some(kind) => display::format_locations(catalog.of_kind(kind)),
                None => display::format_locations(catalog.locations()),
            };
            print!("{text}");
        }
        Commands::Show { id, mode, filter } => {
            let mut coordinator = SelectionCoordinator::load(source).await?;
            coordinator.map_mut().set_filter(filter);
            coordinator.select_input(Some(&id))?;

            if let Err(e) = coordinator.settle().await {
                log::warn!("{e}");
            }

            let color = coordinator
                .selection()
                .active_location_id()
                .map(|id| coordinator.map().color_for(id, mode));
            print!("{}", display::format_panel(coordinator.panel(), color));
            println!("\nLegend ({mode}, {filter}):");
            print!("{}", display::format_legend(&coordinator.map().legend(mode)));
        }
        Commands::Alerts {
            threshold,
            role,
            location,
            watch,
        } => {
            let viewer = Viewer {
                role,
                location_id: location,
            };

            if let Some(secs) = watch {
                let (mut rx, _handle) =
                    spawn_periodic_refresh(source, threshold, Duration::from_secs(secs.max(1)));
                while rx.changed().await.is_ok() {
                    let snapshot = rx.borrow_and_update().clone();
                    match snapshot {
                        AlertSnapshot::Pending => {}
                        AlertSnapshot::Ready(alerts) => {
                            let visible = health_map_alert::filter(&alerts, threshold, &viewer);
                            print!("{}", display::format_alerts(&visible));
                        }
                        AlertSnapshot::Failed(failure) => eprintln!("{failure}"),
                    }
                }
                return Ok(());
            }

            let mut feed = AlertFeed::new(source, threshold);
            feed.refresh().await?;
            print!("{}", display::format_alerts(&feed.visible(&viewer)));
        }
    }

    Ok(())
}
