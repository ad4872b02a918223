pub mod analyzer;
pub mod calculator;
pub mod invalidator;
pub mod rates;
pub mod simulation;
pub mod suggestions;
pub mod summary;

pub use analyzer::{delta_percentage, round_half_up, ImpactAnalyzer};
pub use calculator::{value_added, TaxCalculator};
pub use invalidator::CacheInvalidator;
pub use rates::{RateResolver, ResolvedRate, Source};
pub use simulation::{DisplayAmounts, Simulation, Simulator};
pub use suggestions::{ResolvedSuggestions, SuggestionResolver};
pub use summary::BatchSummary;
