use super::analyzer::round_half_up;
use super::simulation::Simulation;
use crate::core::{ImpactClassification, Sector};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregates over a batch of simulations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub average_revenue: Decimal,
    pub average_current_tax: Decimal,
    pub average_reform_tax: Decimal,
    /// Count per classification, most frequent first
    pub impact_distribution: Vec<(ImpactClassification, usize)>,
    /// Up to three sectors, most frequent first
    pub top_sectors: Vec<(Sector, usize)>,
}

impl BatchSummary {
    pub fn from_simulations(simulations: &[Simulation]) -> Self {
        let total = simulations.len();
        let average = |f: fn(&Simulation) -> Decimal| {
            if total == 0 {
                return round_half_up(Decimal::ZERO);
            }
            let sum = simulations
                .iter()
                .fold(Decimal::ZERO, |acc, s| acc.saturating_add(f(s)));
            round_half_up(sum / Decimal::from(total))
        };

        let mut impacts: BTreeMap<ImpactClassification, usize> = BTreeMap::new();
        let mut sectors: BTreeMap<Sector, usize> = BTreeMap::new();
        for sim in simulations {
            *impacts.entry(sim.analysis.impact_classification).or_default() += 1;
            *sectors.entry(sim.input.sector).or_default() += 1;
        }

        BatchSummary {
            total,
            average_revenue: average(|s| s.input.monthly_revenue),
            average_current_tax: average(|s| s.current_tax),
            average_reform_tax: average(|s| s.reform_tax),
            impact_distribution: by_count_desc(impacts),
            top_sectors: by_count_desc(sectors).into_iter().take(3).collect(),
        }
    }
}

/// Sort by count descending; equal counts keep key order
fn by_count_desc<K: Ord>(counts: BTreeMap<K, usize>) -> Vec<(K, usize)> {
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
