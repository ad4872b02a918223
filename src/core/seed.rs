//! Initial data set for the in-memory stores

use super::model::{ImpactClassification, RateRule, RuleType, Sector, SuggestionEntry};
use super::store::{MemoryRuleStore, MemorySuggestionStore};
use rust_decimal_macros::dec;

use super::model::ImpactClassification::{Negative, Neutral, Positive};

const SUGGESTIONS: &[(Sector, ImpactClassification, [&str; 3])] = &[
    (
        Sector::Services,
        Negative,
        [
            "Services tend to be the sector most affected by the single IBS/CBS rate. Review your profit margin.",
            "Consider renegotiating long-term contracts to account for the higher burden on revenue.",
            "Evaluate claiming credits on inputs, which will be broadly allowed.",
        ],
    ),
    (
        Sector::Services,
        Positive,
        [
            "Tax simplification can significantly cut the administrative cost of delivering your services.",
            "Take advantage of the tax relief on technology investments to streamline your operation.",
            "With a lower burden, consider passing the gain on to final prices to become more competitive.",
        ],
    ),
    (
        Sector::Services,
        Neutral,
        [
            "Keep monitoring the complementary laws that will set the specific rates for your subsector.",
            "Prepare your invoicing system for the new VAT model (IBS/CBS).",
            "Follow the transition period to adjust cash flow to the new due dates.",
        ],
    ),
    (
        Sector::Commerce,
        Negative,
        [
            "Analyze the impact on selling prices, especially for low-margin items.",
            "Check that your suppliers have adapted to the new regime to keep your credits intact.",
            "Cash flow may be affected by the change in when the tax becomes due.",
        ],
    ),
    (
        Sector::Commerce,
        Positive,
        [
            "Less cumulative taxation can benefit your supply chain.",
            "Less red tape on moving goods between states should simplify your logistics.",
            "Consider expanding into new regional markets under the single national rate.",
        ],
    ),
    (
        Sector::Commerce,
        Neutral,
        [
            "Make sure your pricing reflects the new composition of taxes (IBS/CBS).",
            "Monitor the changes to credit rules for goods held in stock during the transition.",
            "Keep your product catalogue up to date to avoid applying the new rates incorrectly.",
        ],
    ),
    (
        Sector::Industry,
        Negative,
        [
            "Plan large fixed-asset investments around the new credit recovery model.",
            "Review raw material costs and the effect of the IPI phase-out on your chain.",
            "Assess the impact on existing regional incentives that may be removed or changed.",
        ],
    ),
    (
        Sector::Industry,
        Positive,
        [
            "Full relief on exports and investments should boost your international competitiveness.",
            "Full non-cumulativity will let you recover taxes paid on practically every input.",
            "The end of IPI will drastically simplify your tax control and ancillary obligations.",
        ],
    ),
    (
        Sector::Industry,
        Neutral,
        [
            "Plan the upgrade of your ERP systems to support VAT calculation.",
            "Watch the transition rules for using credits accumulated under the old regime.",
            "Follow the definition of the Selective Tax, which may apply to certain products.",
        ],
    ),
];

/// Rules for the initial data set: one unscoped active rule per rule type
pub fn rate_rules() -> Vec<RateRule> {
    vec![
        RateRule {
            name: "Simples Nacional - average rate".to_string(),
            ..RateRule::new(RuleType::SimplesNacional, dec!(0.1000))
        },
        RateRule {
            name: "Lucro Presumido - consolidated burden (PIS/COFINS/ISS/IRPJ/CSLL)".to_string(),
            ..RateRule::new(RuleType::LucroPresumido, dec!(0.1633))
        },
        RateRule {
            name: "Reform - estimated IBS/CBS".to_string(),
            ..RateRule::new(RuleType::Reform, dec!(0.2650))
        },
    ]
}

pub fn suggestion_entries() -> Vec<SuggestionEntry> {
    SUGGESTIONS
        .iter()
        .flat_map(|(sector, impact, texts)| {
            texts
                .iter()
                .map(move |text| SuggestionEntry::new(*sector, *impact, *text))
        })
        .collect()
}

impl MemoryRuleStore {
    /// A store holding [`rate_rules`]
    pub fn seeded() -> Self {
        let store = Self::new();
        for rule in rate_rules() {
            store.create(rule);
        }
        store
    }
}

impl MemorySuggestionStore {
    /// A store holding [`suggestion_entries`]
    pub fn seeded() -> Self {
        let store = Self::new();
        for entry in suggestion_entries() {
            store.create(entry);
        }
        store
    }
}
