//! Plain-text rendering of dashboard state.

use std::fmt::Write as _;

use health_map_alert_models::Alert;
use health_map_dashboard::{DetailPanel, SectionState};
use health_map_location_models::Location;
use health_map_map::{ColorToken, LegendEntry};

/// Renders a location table.
#[must_use]
pub fn format_locations<'a>(locations: impl IntoIterator<Item = &'a Location>) -> String {
    let mut output = String::new();
    writeln!(output, "{:<6} {:<32} {:<16} {:>14}", "ID", "NAME", "KIND", "POPULATION").unwrap();
    writeln!(output, "{}", "-".repeat(71)).unwrap();

    let mut count = 0usize;
    for location in locations {
        writeln!(
            output,
            "{:<6} {:<32} {:<16} {:>14}",
            location.id,
            truncate(&location.name, 32),
            location.kind,
            location.population
        )
        .unwrap();
        count += 1;
    }

    writeln!(output, "\n{count} location(s)").unwrap();
    output
}

/// Renders the detail panel, with the selected region's map color.
#[must_use]
pub fn format_panel(panel: &DetailPanel, map_color: Option<ColorToken>) -> String {
    let mut output = String::new();

    let Some(location) = &panel.location else {
        writeln!(output, "No location selected.").unwrap();
        return output;
    };

    writeln!(output, "{} ({}, id {})", location.name, location.kind, location.id).unwrap();
    writeln!(output, "Population: {}", location.population).unwrap();
    if let Some(color) = map_color {
        writeln!(output, "Map color: {}", color.hex()).unwrap();
    }
    writeln!(output).unwrap();

    writeln!(output, "--- RISK ---").unwrap();
    match &panel.risk {
        SectionState::Idle => writeln!(output, "(not loaded)").unwrap(),
        SectionState::Loading => writeln!(output, "Loading...").unwrap(),
        SectionState::Failed(failure) => writeln!(output, "Error: {}", failure.reason).unwrap(),
        SectionState::Loaded(risk) => {
            match risk.overall.contributing_disease {
                Some(disease) => {
                    writeln!(output, "Overall: {} (driven by {disease})", risk.overall.level)
                        .unwrap();
                }
                None => writeln!(output, "Overall: {}", risk.overall.level).unwrap(),
            }
            if let Some(rate) = risk.overall_rate {
                writeln!(output, "Overall rate: {rate:.1} per 100k").unwrap();
            }
            for record in &risk.records {
                write!(
                    output,
                    "  {:<12} {:<9} p={:.2}",
                    record.disease, record.risk_level, record.probability
                )
                .unwrap();
                if let Some(rate) = record.rate_per_100k {
                    write!(output, "  {rate:.1}/100k").unwrap();
                }
                writeln!(output).unwrap();
            }
        }
    }
    writeln!(output).unwrap();

    writeln!(output, "--- RESOURCES ---").unwrap();
    match &panel.resources {
        SectionState::Idle => writeln!(output, "(not loaded)").unwrap(),
        SectionState::Loading => writeln!(output, "Loading...").unwrap(),
        SectionState::Failed(failure) => writeln!(output, "Error: {}", failure.reason).unwrap(),
        SectionState::Loaded(resources) => {
            for gap in &resources.gaps {
                writeln!(
                    output,
                    "  {:<18} {:>5.1}%  {}",
                    gap.category.label(),
                    gap.ratio,
                    gap.status
                )
                .unwrap();
            }
            if resources.recommendations.is_empty() {
                writeln!(output, "All resources sufficient.").unwrap();
            } else {
                writeln!(output, "Recommendations:").unwrap();
                for recommendation in &resources.recommendations {
                    writeln!(output, "  - {}", recommendation.message).unwrap();
                }
            }
        }
    }

    output
}

/// Renders an alert list.
#[must_use]
pub fn format_alerts(alerts: &[Alert]) -> String {
    let mut output = String::new();

    if alerts.is_empty() {
        writeln!(output, "No alerts.").unwrap();
        return output;
    }

    for alert in alerts {
        let place = alert
            .location_name
            .clone()
            .unwrap_or_else(|| format!("location {}", alert.location_id));
        let date = alert.date.map(|d| format!(" [{d}]")).unwrap_or_default();
        writeln!(
            output,
            "{:<9} {:<10} {:>5.0}%  {place}{date}: {}",
            alert.risk_level,
            alert.disease,
            alert.probability * 100.0,
            alert.message
        )
        .unwrap();
    }

    writeln!(output, "\n{} alert(s)", alerts.len()).unwrap();
    output
}

/// Renders a map legend.
#[must_use]
pub fn format_legend(entries: &[LegendEntry]) -> String {
    let mut output = String::new();
    for entry in entries {
        writeln!(output, "  {}  {}", entry.color.hex(), entry.label).unwrap();
    }
    output
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use health_map_dashboard::{ResourceSection, RiskSection};
    use health_map_location_models::LocationKind;
    use health_map_resource_models::{GapStatus, Recommendation, ResourceCategory, ResourceGap};
    use health_map_risk_models::{Disease, OverallRisk, RiskLevel};
    use health_map_source_models::{FetchCategory, FetchFailure};

    use super::*;

    fn kerala() -> Location {
        Location {
            id: 7,
            name: "Kerala".to_string(),
            kind: LocationKind::State,
            population: 35_000_000,
            area: None,
        }
    }

    #[test]
    fn panel_shows_each_section_independently() {
        let panel = DetailPanel {
            location: Some(kerala()),
            risk: SectionState::Failed(FetchFailure::new(FetchCategory::Risk, "HTTP 500: boom")),
            resources: SectionState::Loaded(ResourceSection {
                gaps: vec![ResourceGap {
                    category: ResourceCategory::Beds,
                    ratio: 50.0,
                    status: GapStatus::Critical,
                }],
                recommendations: vec![Recommendation {
                    category: ResourceCategory::Beds,
                    ratio: 50.0,
                    status: GapStatus::Critical,
                    shortfall: 50,
                    message: "Need 50 more beds in Kerala".to_string(),
                }],
            }),
        };

        let text = format_panel(&panel, Some(ColorToken::Red));
        assert!(text.contains("Kerala (state, id 7)"));
        assert!(text.contains("Error: HTTP 500: boom"));
        assert!(text.contains("Need 50 more beds in Kerala"));
        assert!(text.contains("#f44336"));
    }

    #[test]
    fn panel_names_contributing_disease() {
        let panel = DetailPanel {
            location: Some(kerala()),
            risk: SectionState::Loaded(RiskSection {
                records: Vec::new(),
                overall: OverallRisk {
                    level: RiskLevel::Critical,
                    contributing_disease: Some(Disease::Dengue),
                },
                overall_rate: Some(42.0),
                climate_snapshot: serde_json::Value::Null,
            }),
            resources: SectionState::Loading,
        };

        let text = format_panel(&panel, None);
        assert!(text.contains("Overall: critical (driven by dengue)"));
        assert!(text.contains("42.0 per 100k"));
        assert!(text.contains("Loading..."));
    }

    #[test]
    fn empty_alert_list() {
        assert_eq!(format_alerts(&[]), "No alerts.\n");
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("Dadra and Nagar Haveli and Daman and Diu", 12), "Dadra and...");
        assert_eq!(truncate("Goa", 12), "Goa");
    }
}
