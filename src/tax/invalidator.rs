use crate::core::{Cache, CacheKey, ImpactClassification, MutationListener, RuleType, Sector};
use std::sync::Arc;

/// Write-side counterpart of the resolvers: each mutation event deletes
/// exactly the one cache key it affects.
#[derive(Clone)]
pub struct CacheInvalidator {
    cache: Arc<Cache>,
}

impl CacheInvalidator {
    pub fn new(cache: Arc<Cache>) -> Self {
        CacheInvalidator { cache }
    }
}

impl MutationListener for CacheInvalidator {
    fn on_rule_changed(&self, rule_type: RuleType) {
        self.cache.invalidate(&CacheKey::Rate(rule_type));
    }

    fn on_suggestion_changed(&self, sector: Sector, impact: ImpactClassification) {
        self.cache.invalidate(&CacheKey::Suggestions(sector, impact));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CacheValue, Ticket};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn fill(cache: &Cache, keys: &[CacheKey]) {
        for key in keys {
            let ticket: Ticket = cache.ticket(key);
            cache.populate(*key, CacheValue::Rate(dec!(0.1)), ticket);
        }
    }

    #[test]
    fn rule_change_deletes_only_its_key() {
        let cache = Arc::new(Cache::new(Duration::from_secs(60)));
        let simples = CacheKey::Rate(RuleType::SimplesNacional);
        let reform = CacheKey::Rate(RuleType::Reform);
        let services = CacheKey::Suggestions(Sector::Services, ImpactClassification::Negative);
        fill(&cache, &[simples, reform, services]);

        CacheInvalidator::new(cache.clone()).on_rule_changed(RuleType::Reform);

        assert!(cache.get(&simples).is_some());
        assert!(cache.get(&reform).is_none());
        assert!(cache.get(&services).is_some());
    }

    #[test]
    fn suggestion_change_deletes_only_its_key() {
        let cache = Arc::new(Cache::new(Duration::from_secs(60)));
        let negative = CacheKey::Suggestions(Sector::Services, ImpactClassification::Negative);
        let positive = CacheKey::Suggestions(Sector::Services, ImpactClassification::Positive);
        fill(&cache, &[negative, positive]);

        let invalidator = CacheInvalidator::new(cache.clone());
        invalidator.on_suggestion_changed(Sector::Services, ImpactClassification::Negative);
        // repeated delivery is harmless
        invalidator.on_suggestion_changed(Sector::Services, ImpactClassification::Negative);

        assert!(cache.get(&negative).is_none());
        assert!(cache.get(&positive).is_some());
    }
}
