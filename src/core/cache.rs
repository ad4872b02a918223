//! Process-wide cache shared by the resolvers and the invalidator
//!
//! Every operation takes the map lock once and performs a single set or
//! delete, so a reader never observes a partially written value. Each key
//! also carries a generation that invalidation bumps: a resolver takes a
//! [`Ticket`] before querying its store and the populate is dropped if the
//! key was invalidated in between.

use super::model::{ImpactClassification, RuleType, Sector};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Rate(RuleType),
    Suggestions(Sector, ImpactClassification),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Rate(rule_type) => write!(f, "rate:{}", rule_type),
            CacheKey::Suggestions(sector, impact) => write!(f, "suggestions:{}:{}", sector, impact),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheValue {
    Rate(Decimal),
    Suggestions(Vec<String>),
}

/// Generation of a key observed before a store query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
struct Entry {
    value: CacheValue,
    /// None when the ttl is too large to represent
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<CacheKey, Entry>,
    generations: HashMap<CacheKey, u64>,
}

impl State {
    fn generation(&self, key: &CacheKey) -> u64 {
        self.generations.get(key).copied().unwrap_or(0)
    }
}

#[derive(Debug)]
pub struct Cache {
    ttl: Duration,
    state: RwLock<State>,
}

impl Cache {
    pub fn new(ttl: Duration) -> Self {
        Cache {
            ttl,
            state: RwLock::new(State::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live value for `key`. An expired entry reads as absent and is removed.
    pub fn get(&self, key: &CacheKey) -> Option<CacheValue> {
        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            match state.entries.get(key) {
                None => return None,
                Some(entry) if entry.is_live(Instant::now()) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let expired = state
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_live(Instant::now()));
        if expired {
            state.entries.remove(key);
            log::debug!("Cache expired {}", key);
        }
        None
    }

    /// Record the current generation of `key`, to be passed to [`Cache::populate`]
    pub fn ticket(&self, key: &CacheKey) -> Ticket {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ticket(state.generation(key))
    }

    /// Store `value` unless `key` was invalidated since `ticket` was taken.
    /// Returns whether the value was stored.
    pub fn populate(&self, key: CacheKey, value: CacheValue, ticket: Ticket) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.generation(&key) != ticket.0 {
            log::debug!("Cache populate of {} dropped, invalidated while loading", key);
            return false;
        }
        let expires_at = Instant::now().checked_add(self.ttl);
        state.entries.insert(key, Entry { value, expires_at });
        log::debug!("Cache populated {} (ttl {:?})", key, self.ttl);
        true
    }

    /// Delete `key` and advance its generation. Deleting an absent key is a no-op
    /// apart from the generation bump. Returns whether an entry was removed.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state.generations.entry(*key).or_insert(0) += 1;
        let removed = state.entries.remove(key).is_some();
        log::debug!("Cache invalidated {} (present: {})", key, removed);
        removed
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        state.entries.values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const RATE: CacheKey = CacheKey::Rate(RuleType::SimplesNacional);

    fn cache() -> Cache {
        Cache::new(Duration::from_secs(60))
    }

    #[test]
    fn key_format() {
        assert_eq!(RATE.to_string(), "rate:SIMPLES_NACIONAL");
        assert_eq!(
            CacheKey::Suggestions(Sector::Services, ImpactClassification::Negative).to_string(),
            "suggestions:SERVICES:NEGATIVE"
        );
    }

    #[test]
    fn populate_then_get() {
        let cache = cache();
        assert_eq!(cache.get(&RATE), None);

        let ticket = cache.ticket(&RATE);
        assert!(cache.populate(RATE, CacheValue::Rate(dec!(0.1633)), ticket));
        assert_eq!(cache.get(&RATE), Some(CacheValue::Rate(dec!(0.1633))));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_removes_entry() {
        let cache = cache();
        let ticket = cache.ticket(&RATE);
        cache.populate(RATE, CacheValue::Rate(dec!(0.10)), ticket);

        assert!(cache.invalidate(&RATE));
        assert_eq!(cache.get(&RATE), None);
        // idempotent
        assert!(!cache.invalidate(&RATE));
        assert!(cache.is_empty());
    }

    #[test]
    fn populate_after_invalidation_is_dropped() {
        let cache = cache();
        let stale = cache.ticket(&RATE);
        cache.invalidate(&RATE);

        assert!(!cache.populate(RATE, CacheValue::Rate(dec!(0.10)), stale));
        assert_eq!(cache.get(&RATE), None);

        let fresh = cache.ticket(&RATE);
        assert!(cache.populate(RATE, CacheValue::Rate(dec!(0.12)), fresh));
        assert_eq!(cache.get(&RATE), Some(CacheValue::Rate(dec!(0.12))));
    }

    #[test]
    fn invalidation_is_targeted() {
        let cache = cache();
        let other = CacheKey::Rate(RuleType::Reform);
        for key in [RATE, other] {
            let ticket = cache.ticket(&key);
            cache.populate(key, CacheValue::Rate(dec!(0.10)), ticket);
        }

        cache.invalidate(&RATE);
        assert_eq!(cache.get(&other), Some(CacheValue::Rate(dec!(0.10))));
    }

    #[test]
    fn zero_ttl_entries_expire_immediately() {
        let cache = Cache::new(Duration::ZERO);
        let ticket = cache.ticket(&RATE);
        cache.populate(RATE, CacheValue::Rate(dec!(0.10)), ticket);

        assert_eq!(cache.state.read().unwrap().entries.len(), 1);
        assert_eq!(cache.get(&RATE), None);
        assert!(cache.state.read().unwrap().entries.is_empty());
    }
}
