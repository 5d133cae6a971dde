#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Overall risk aggregation.
//!
//! A location's overall risk is the worst risk of any of its diseases: a
//! single critical disease makes the whole location critical. All
//! functions here are pure and synchronous, and none of them depend on the
//! order of the input records.

use std::cmp::Reverse;

use health_map_risk_models::{Disease, DiseaseRiskRecord, OverallRisk, RiskLevel};

/// Reduces a set of per-disease records into one [`OverallRisk`].
///
/// The overall level is the maximum level across all records. When several
/// records share that level the contributing disease is the one declared
/// first in [`Disease`]. Records whose level is [`RiskLevel::Unknown`]
/// never contribute, so an empty or all-unknown input yields
/// [`OverallRisk::UNKNOWN`]. This deliberately skips the disease
/// tie-break for all-unknown input rather than naming dengue.
#[must_use]
pub fn aggregate(records: &[DiseaseRiskRecord]) -> OverallRisk {
    records
        .iter()
        .filter(|record| record.risk_level != RiskLevel::Unknown)
        .max_by_key(|record| (record.risk_level, Reverse(record.disease)))
        .map_or(OverallRisk::UNKNOWN, |record| OverallRisk {
            level: record.risk_level,
            contributing_disease: Some(record.disease),
        })
}

/// Returns the highest level recorded for a single disease.
///
/// Returns [`RiskLevel::Unknown`] when the disease has no record.
#[must_use]
pub fn disease_level(records: &[DiseaseRiskRecord], disease: Disease) -> RiskLevel {
    records
        .iter()
        .filter(|record| record.disease == disease)
        .map(|record| record.risk_level)
        .max()
        .unwrap_or(RiskLevel::Unknown)
}

/// Returns the highest per-100k case rate recorded for a single disease.
#[must_use]
pub fn disease_rate(records: &[DiseaseRiskRecord], disease: Disease) -> Option<f64> {
    records
        .iter()
        .filter(|record| record.disease == disease)
        .filter_map(|record| record.rate_per_100k)
        .filter(|rate| rate.is_finite())
        .reduce(f64::max)
}

/// Mean per-100k case rate across every record that reports one.
///
/// This is the overall disease burden of a location. Returns `None` when
/// no record carries a finite rate.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn overall_rate(records: &[DiseaseRiskRecord]) -> Option<f64> {
    let rates: Vec<f64> = records
        .iter()
        .filter_map(|record| record.rate_per_100k)
        .filter(|rate| rate.is_finite())
        .collect();

    if rates.is_empty() {
        return None;
    }

    let burden = rates.iter().sum::<f64>() / rates.len() as f64;
    log::trace!("overall_rate: {burden:.2} per 100k from {} records", rates.len());
    Some(burden)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(disease: Disease, risk_level: RiskLevel) -> DiseaseRiskRecord {
        DiseaseRiskRecord {
            disease,
            probability: 0.5,
            risk_level,
            rate_per_100k: None,
        }
    }

    /// Heap's algorithm; small inputs only.
    fn permutations(items: &[DiseaseRiskRecord]) -> Vec<Vec<DiseaseRiskRecord>> {
        fn heap(k: usize, items: &mut Vec<DiseaseRiskRecord>, out: &mut Vec<Vec<DiseaseRiskRecord>>) {
            if k <= 1 {
                out.push(items.clone());
                return;
            }
            for i in 0..k {
                heap(k - 1, items, out);
                if k % 2 == 0 {
                    items.swap(i, k - 1);
                } else {
                    items.swap(0, k - 1);
                }
            }
        }

        let mut items = items.to_vec();
        let mut out = Vec::new();
        heap(items.len(), &mut items, &mut out);
        out
    }

    #[test]
    fn worst_case_dominates() {
        let overall = aggregate(&[
            record(Disease::Dengue, RiskLevel::Critical),
            record(Disease::Malaria, RiskLevel::Low),
        ]);
        assert_eq!(overall.level, RiskLevel::Critical);
        assert_eq!(overall.contributing_disease, Some(Disease::Dengue));
    }

    #[test]
    fn empty_input_is_unknown() {
        assert_eq!(aggregate(&[]), OverallRisk::UNKNOWN);
    }

    #[test]
    fn all_unknown_has_no_contributor() {
        let overall = aggregate(&[
            record(Disease::Malaria, RiskLevel::Unknown),
            record(Disease::Dengue, RiskLevel::Unknown),
        ]);
        assert_eq!(overall, OverallRisk::UNKNOWN);
    }

    #[test]
    fn ties_break_by_disease_order() {
        let overall = aggregate(&[
            record(Disease::Diarrhea, RiskLevel::High),
            record(Disease::Heatstroke, RiskLevel::High),
            record(Disease::Malaria, RiskLevel::High),
            record(Disease::Dengue, RiskLevel::Medium),
        ]);
        assert_eq!(overall.level, RiskLevel::High);
        assert_eq!(overall.contributing_disease, Some(Disease::Malaria));
    }

    #[test]
    fn every_permutation_aggregates_identically() {
        let records = vec![
            record(Disease::Heatstroke, RiskLevel::High),
            record(Disease::Dengue, RiskLevel::Medium),
            record(Disease::Diarrhea, RiskLevel::High),
            record(Disease::Malaria, RiskLevel::Unknown),
        ];
        let expected = aggregate(&records);
        assert_eq!(expected.contributing_disease, Some(Disease::Heatstroke));

        let all = permutations(&records);
        assert_eq!(all.len(), 24);
        for permutation in &all {
            assert_eq!(aggregate(permutation), expected);
            // Re-aggregating must not drift.
            assert_eq!(aggregate(permutation), aggregate(permutation));
        }
    }

    #[test]
    fn disease_level_picks_that_disease_only() {
        let records = [
            record(Disease::Dengue, RiskLevel::Critical),
            record(Disease::Malaria, RiskLevel::Medium),
        ];
        assert_eq!(disease_level(&records, Disease::Malaria), RiskLevel::Medium);
        assert_eq!(disease_level(&records, Disease::Diarrhea), RiskLevel::Unknown);
    }

    #[test]
    fn overall_rate_is_mean_of_reported_rates() {
        let mut with_rate = record(Disease::Dengue, RiskLevel::Low);
        with_rate.rate_per_100k = Some(30.0);
        let mut other = record(Disease::Malaria, RiskLevel::Low);
        other.rate_per_100k = Some(10.0);
        let without = record(Disease::Diarrhea, RiskLevel::Low);

        let rate = overall_rate(&[with_rate.clone(), other, without.clone()]).unwrap();
        assert!((rate - 20.0).abs() < f64::EPSILON);
        assert_eq!(overall_rate(&[without]), None);
        assert_eq!(disease_rate(&[with_rate], Disease::Dengue), Some(30.0));
    }
}
