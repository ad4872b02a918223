//! Full current-versus-reform simulation over shared resolvers

use super::analyzer::{round_half_up, ImpactAnalyzer};
use super::calculator::TaxCalculator;
use super::invalidator::CacheInvalidator;
use super::rates::RateResolver;
use super::suggestions::SuggestionResolver;
use crate::core::{
    Cache, FinancialInput, ImpactClassification, ImpactResult, MemoryRuleStore,
    MemorySuggestionStore, RuleStore, Sector, Settings, SuggestionStore, TaxRegime,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;

/// Amounts rounded to currency precision for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayAmounts {
    pub current_tax: Decimal,
    pub reform_tax: Decimal,
    pub delta_value: Decimal,
    pub delta_percentage: Decimal,
}

/// Result of one simulation
#[derive(Debug, Clone, Serialize)]
pub struct Simulation {
    pub simulated_at: DateTime<Utc>,
    pub input: FinancialInput,
    /// Full precision current regime tax
    pub current_tax: Decimal,
    /// Full precision reform tax
    pub reform_tax: Decimal,
    pub display: DisplayAmounts,
    pub analysis: ImpactResult,
}

/// Entry point to the calculator and analyzer, sharing one cache
#[derive(Clone)]
pub struct Simulator {
    cache: Arc<Cache>,
    calculator: TaxCalculator,
    analyzer: ImpactAnalyzer,
}

impl Simulator {
    pub fn new(
        settings: Arc<Settings>,
        rules: Arc<dyn RuleStore>,
        suggestions: Arc<dyn SuggestionStore>,
    ) -> Self {
        let cache = Arc::new(Cache::new(settings.cache_ttl()));
        let rates = RateResolver::new(rules, cache.clone(), settings.clone());
        let suggestions = SuggestionResolver::new(suggestions, cache.clone(), settings.clone());
        Simulator {
            cache,
            calculator: TaxCalculator::new(rates),
            analyzer: ImpactAnalyzer::new(suggestions, settings),
        }
    }

    /// Build over in-memory stores, subscribing the cache invalidator to both
    pub fn with_memory_stores(
        settings: Arc<Settings>,
        rules: Arc<MemoryRuleStore>,
        suggestions: Arc<MemorySuggestionStore>,
    ) -> Self {
        let simulator = Self::new(settings, rules.clone(), suggestions.clone());
        let invalidator = Arc::new(simulator.invalidator());
        rules.subscribe(invalidator.clone());
        suggestions.subscribe(invalidator);
        simulator
    }

    /// An invalidator bound to this simulator's cache, for the store's mutation feed
    pub fn invalidator(&self) -> CacheInvalidator {
        CacheInvalidator::new(self.cache.clone())
    }

    pub fn cache(&self) -> &Arc<Cache> {
        &self.cache
    }

    pub fn rates(&self) -> &RateResolver {
        self.calculator.rates()
    }

    pub fn suggestions(&self) -> &SuggestionResolver {
        self.analyzer.suggestions()
    }

    pub fn calculate_current_tax(&self, regime: TaxRegime, revenue: Decimal) -> Decimal {
        self.calculator.calculate_current_tax(regime, revenue)
    }

    pub fn calculate_reform_tax(&self, revenue: Decimal, costs: Decimal) -> Decimal {
        self.calculator.calculate_reform_tax(revenue, costs)
    }

    pub fn analyze(
        &self,
        current_tax: Decimal,
        reform_tax: Decimal,
        sector: Sector,
        state: Option<&str>,
    ) -> ImpactResult {
        self.analyzer.analyze(current_tax, reform_tax, sector, state)
    }

    pub fn get_suggestions(&self, sector: Sector, impact: ImpactClassification) -> Vec<String> {
        self.analyzer.get_suggestions(sector, impact)
    }

    /// Run the calculator and analyzer over one input. The input is not
    /// validated; see [`FinancialInput::validate`].
    pub fn simulate(&self, input: &FinancialInput) -> Simulation {
        let current_tax = self.calculate_current_tax(input.tax_regime, input.monthly_revenue);
        let reform_tax = self.calculate_reform_tax(input.monthly_revenue, input.costs);
        let analysis = self.analyze(current_tax, reform_tax, input.sector, input.state.as_deref());

        Simulation {
            simulated_at: Utc::now(),
            input: input.clone(),
            current_tax,
            reform_tax,
            display: DisplayAmounts {
                current_tax: round_half_up(current_tax),
                reform_tax: round_half_up(reform_tax),
                delta_value: round_half_up(analysis.delta_value),
                delta_percentage: analysis.delta_percentage,
            },
            analysis,
        }
    }
}
