pub mod cache;
pub mod model;
pub mod seed;
pub mod settings;
pub mod store;

// Flat public surface for domain types and collaborators.
pub use cache::{Cache, CacheKey, CacheValue, Ticket};
pub use model::{
    FinancialInput, ImpactClassification, ImpactResult, InputError, ParseError, RateRule,
    RuleType, Sector, SuggestionEntry, TaxRegime,
};
pub use settings::{FallbackRates, Settings, SettingsError};
pub use store::{
    MemoryRuleStore, MemorySuggestionStore, Mutation, MutationListener, RuleStore, StoreError,
    SuggestionStore,
};
