use super::rates::Source;
use crate::core::{Cache, CacheKey, CacheValue, ImpactClassification, Sector, Settings, SuggestionStore};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSuggestions {
    pub suggestions: Vec<String>,
    pub source: Source,
}

/// Cache-aside access to the suggestion store. Never returns an empty list,
/// and never caches one: an empty or failed lookup yields the single
/// fallback suggestion so newly added entries show up on the next call.
#[derive(Clone)]
pub struct SuggestionResolver {
    store: Arc<dyn SuggestionStore>,
    cache: Arc<Cache>,
    settings: Arc<Settings>,
}

impl SuggestionResolver {
    pub fn new(
        store: Arc<dyn SuggestionStore>,
        cache: Arc<Cache>,
        settings: Arc<Settings>,
    ) -> Self {
        SuggestionResolver {
            store,
            cache,
            settings,
        }
    }

    pub fn get_suggestions(&self, sector: Sector, impact: ImpactClassification) -> Vec<String> {
        self.resolve(sector, impact).suggestions
    }

    pub fn resolve(&self, sector: Sector, impact: ImpactClassification) -> ResolvedSuggestions {
        let key = CacheKey::Suggestions(sector, impact);
        if let Some(CacheValue::Suggestions(suggestions)) = self.cache.get(&key) {
            log::debug!("Cache hit {}: {} suggestions", key, suggestions.len());
            return ResolvedSuggestions {
                suggestions,
                source: Source::Cache,
            };
        }

        let ticket = self.cache.ticket(&key);
        match self.store.find_suggestions(sector, impact) {
            Ok(suggestions) if !suggestions.is_empty() => {
                log::debug!("Cache miss {}, {} suggestions from store", key, suggestions.len());
                self.cache
                    .populate(key, CacheValue::Suggestions(suggestions.clone()), ticket);
                ResolvedSuggestions {
                    suggestions,
                    source: Source::Store,
                }
            }
            Ok(_) => {
                log::debug!("No suggestions for {}/{}, using fallback", sector, impact);
                self.fallback()
            }
            Err(err) => {
                log::warn!(
                    "Suggestion lookup for {}/{} failed ({}), using fallback",
                    sector,
                    impact,
                    err
                );
                self.fallback()
            }
        }
    }

    fn fallback(&self) -> ResolvedSuggestions {
        ResolvedSuggestions {
            suggestions: vec![self.settings.fallback_suggestion.clone()],
            source: Source::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::DEFAULT_FALLBACK_SUGGESTION;
    use crate::core::{MemorySuggestionStore, SuggestionEntry};
    use std::time::Duration;

    fn resolver(store: Arc<MemorySuggestionStore>) -> (SuggestionResolver, Arc<Cache>) {
        let cache = Arc::new(Cache::new(Duration::from_secs(60)));
        let settings = Arc::new(Settings::default());
        (SuggestionResolver::new(store, cache.clone(), settings), cache)
    }

    #[test]
    fn no_match_yields_single_fallback() {
        let (suggestions, cache) = resolver(Arc::new(MemorySuggestionStore::seeded()));
        let found = suggestions.get_suggestions(Sector::Other, ImpactClassification::Negative);
        assert_eq!(found, vec![DEFAULT_FALLBACK_SUGGESTION.to_string()]);
        assert!(cache.is_empty());
    }

    #[test]
    fn empty_result_is_not_cached() {
        let store = Arc::new(MemorySuggestionStore::new());
        let (suggestions, _) = resolver(store.clone());

        let first = suggestions.resolve(Sector::Commerce, ImpactClassification::Neutral);
        assert_eq!(first.source, Source::Fallback);

        // inserted without any invalidation path
        store.create(SuggestionEntry::new(
            Sector::Commerce,
            ImpactClassification::Neutral,
            "Review your pricing.",
        ));
        let second = suggestions.resolve(Sector::Commerce, ImpactClassification::Neutral);
        assert_eq!(second.source, Source::Store);
        assert_eq!(second.suggestions, vec!["Review your pricing.".to_string()]);
    }

    #[test]
    fn cached_list_keeps_store_order() {
        let (suggestions, _) = resolver(Arc::new(MemorySuggestionStore::seeded()));
        let from_store = suggestions.resolve(Sector::Services, ImpactClassification::Negative);
        let from_cache = suggestions.resolve(Sector::Services, ImpactClassification::Negative);

        assert_eq!(from_store.source, Source::Store);
        assert_eq!(from_cache.source, Source::Cache);
        assert_eq!(from_store.suggestions, from_cache.suggestions);
        assert!(from_cache.suggestions[0].starts_with("Services tend to be the sector most affected"));
    }

    #[test]
    fn unavailable_store_yields_fallback() {
        let store = Arc::new(MemorySuggestionStore::seeded());
        store.set_available(false);
        let (suggestions, _) = resolver(store);
        let found = suggestions.resolve(Sector::Industry, ImpactClassification::Positive);
        assert_eq!(found.source, Source::Fallback);
        assert_eq!(found.suggestions.len(), 1);
    }
}
