use crate::core::{Cache, CacheKey, CacheValue, RuleStore, RuleType, Settings};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Store,
    Fallback,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Source::Cache => "cache",
            Source::Store => "store",
            Source::Fallback => "fallback",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRate {
    pub rate: Decimal,
    pub source: Source,
}

/// Cache-aside access to the rule store.
///
/// A hit is served without touching the store. A miss queries the store and
/// caches what it finds. When the store fails or has no active rule the
/// configured fallback rate is returned and nothing is cached, so a recovered
/// store is seen on the next call.
#[derive(Clone)]
pub struct RateResolver {
    store: Arc<dyn RuleStore>,
    cache: Arc<Cache>,
    settings: Arc<Settings>,
}

impl RateResolver {
    pub fn new(store: Arc<dyn RuleStore>, cache: Arc<Cache>, settings: Arc<Settings>) -> Self {
        RateResolver {
            store,
            cache,
            settings,
        }
    }

    pub fn get_rate(&self, rule_type: RuleType) -> Decimal {
        self.resolve(rule_type).rate
    }

    pub fn resolve(&self, rule_type: RuleType) -> ResolvedRate {
        let key = CacheKey::Rate(rule_type);
        if let Some(CacheValue::Rate(rate)) = self.cache.get(&key) {
            log::debug!("Cache hit {}: {}", key, rate);
            return ResolvedRate {
                rate,
                source: Source::Cache,
            };
        }

        let ticket = self.cache.ticket(&key);
        match self.store.find_active_rule(rule_type, None, None) {
            Ok(Some(rate)) => {
                log::debug!("Cache miss {}, store rate {}", key, rate);
                self.cache.populate(key, CacheValue::Rate(rate), ticket);
                ResolvedRate {
                    rate,
                    source: Source::Store,
                }
            }
            Ok(None) => {
                log::warn!("No active rule for {}, using fallback rate", rule_type);
                self.fallback(rule_type)
            }
            Err(err) => {
                log::warn!("Rule lookup for {} failed ({}), using fallback rate", rule_type, err);
                self.fallback(rule_type)
            }
        }
    }

    fn fallback(&self, rule_type: RuleType) -> ResolvedRate {
        ResolvedRate {
            rate: self.settings.fallback_rate(rule_type),
            source: Source::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MemoryRuleStore, RateRule};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn resolver(store: Arc<MemoryRuleStore>) -> (RateResolver, Arc<Cache>) {
        let cache = Arc::new(Cache::new(Duration::from_secs(60)));
        let settings = Arc::new(Settings::default());
        (RateResolver::new(store, cache.clone(), settings), cache)
    }

    #[test]
    fn empty_store_uses_fallback_rates() {
        let (rates, cache) = resolver(Arc::new(MemoryRuleStore::new()));
        assert_eq!(rates.get_rate(RuleType::SimplesNacional), dec!(0.10));
        assert_eq!(rates.get_rate(RuleType::LucroPresumido), dec!(0.1633));
        assert_eq!(rates.get_rate(RuleType::Reform), dec!(0.265));
        assert!(cache.is_empty());
    }

    #[test]
    fn miss_populates_then_hit() {
        let store = Arc::new(MemoryRuleStore::new());
        store.create(RateRule::new(RuleType::SimplesNacional, dec!(0.1500)));
        let (rates, cache) = resolver(store);

        let first = rates.resolve(RuleType::SimplesNacional);
        assert_eq!(first, ResolvedRate { rate: dec!(0.1500), source: Source::Store });
        assert_eq!(
            cache.get(&CacheKey::Rate(RuleType::SimplesNacional)),
            Some(CacheValue::Rate(dec!(0.1500)))
        );

        let second = rates.resolve(RuleType::SimplesNacional);
        assert_eq!(second, ResolvedRate { rate: dec!(0.1500), source: Source::Cache });
    }

    #[test]
    fn unavailable_store_falls_back_without_caching() {
        let store = Arc::new(MemoryRuleStore::new());
        store.create(RateRule::new(RuleType::Reform, dec!(0.2800)));
        store.set_available(false);
        let (rates, cache) = resolver(store.clone());

        assert_eq!(rates.resolve(RuleType::Reform).source, Source::Fallback);
        assert_eq!(rates.get_rate(RuleType::Reform), dec!(0.2650));
        assert!(cache.is_empty());

        store.set_available(true);
        assert_eq!(rates.get_rate(RuleType::Reform), dec!(0.2800));
    }

    #[test]
    fn rate_precision_survives_cache_round_trips() {
        let store = Arc::new(MemoryRuleStore::new());
        store.create(RateRule::new(RuleType::LucroPresumido, dec!(0.1633)));
        let (rates, _) = resolver(store);

        for _ in 0..5 {
            let rate = rates.get_rate(RuleType::LucroPresumido);
            assert_eq!(rate, dec!(0.1633));
            assert_eq!(rate.to_string(), "0.1633");
        }
    }
}
