//! Rule and suggestion stores
//!
//! The core only reads through [`RuleStore`] and [`SuggestionStore`]. The
//! in-memory implementations here stand in for the persistence layer: they
//! own the write side and notify subscribed [`MutationListener`]s once per
//! committed mutation.

use super::model::{ImpactClassification, RateRule, RuleType, Sector, SuggestionEntry};
use rust_decimal::Decimal;
use std::fmt;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable")]
    Unavailable,
    #[error("record not found: {0}")]
    NotFound(u64),
}

pub trait RuleStore: Send + Sync {
    /// Rate of the active rule for `rule_type` that best matches the scope, if any
    fn find_active_rule(
        &self,
        rule_type: RuleType,
        sector: Option<Sector>,
        state: Option<&str>,
    ) -> Result<Option<Decimal>, StoreError>;
}

pub trait SuggestionStore: Send + Sync {
    /// Suggestion texts for a (sector, impact) pair, in store order
    fn find_suggestions(
        &self,
        sector: Sector,
        impact: ImpactClassification,
    ) -> Result<Vec<String>, StoreError>;
}

/// Receives one call per committed create, update or delete
pub trait MutationListener: Send + Sync {
    fn on_rule_changed(&self, rule_type: RuleType);
    fn on_suggestion_changed(&self, sector: Sector, impact: ImpactClassification);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mutation::Created => "created",
            Mutation::Updated => "updated",
            Mutation::Deleted => "deleted",
        };
        write!(f, "{}", s)
    }
}

#[derive(Default)]
struct Listeners(RwLock<Vec<Arc<dyn MutationListener>>>);

impl Listeners {
    fn add(&self, listener: Arc<dyn MutationListener>) {
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    fn each(&self, f: impl Fn(&dyn MutationListener)) {
        let listeners = self.0.read().unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            f(listener.as_ref());
        }
    }
}

struct Table<T> {
    next_id: u64,
    records: Vec<T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table {
            next_id: 0,
            records: Vec::new(),
        }
    }
}

/// In-memory rule store
pub struct MemoryRuleStore {
    table: RwLock<Table<RateRule>>,
    available: AtomicBool,
    listeners: Listeners,
}

impl Default for MemoryRuleStore {
    fn default() -> Self {
        MemoryRuleStore {
            table: RwLock::new(Table::default()),
            available: AtomicBool::new(true),
            listeners: Listeners::default(),
        }
    }
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rules from CSV with columns `rule_type,sector,state,rate,active,name`.
    /// Loading does not emit mutation events.
    pub fn read_csv<R: Read>(reader: R) -> anyhow::Result<Self> {
        let store = Self::new();
        let mut rdr = csv::Reader::from_reader(reader);
        {
            let mut table = store.write_table();
            for result in rdr.deserialize() {
                let mut rule: RateRule = result?;
                rule.rate.rescale(4);
                table.next_id += 1;
                rule.id = table.next_id;
                table.records.push(rule);
            }
            log::info!("Read {} rate rules", table.records.len());
        }
        Ok(store)
    }

    pub fn subscribe(&self, listener: Arc<dyn MutationListener>) {
        self.listeners.add(listener);
    }

    /// Simulate an outage: while unavailable every query fails
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Snapshot of all rules in creation order
    pub fn rules(&self) -> Vec<RateRule> {
        self.read_table().records.clone()
    }

    /// Insert a rule, returning its id
    pub fn create(&self, mut rule: RateRule) -> u64 {
        let id = {
            let mut table = self.write_table();
            table.next_id += 1;
            rule.id = table.next_id;
            table.records.push(rule.clone());
            rule.id
        };
        self.notify(Mutation::Created, &rule);
        id
    }

    /// Change the rate and active flag of a rule. The rule type and scope are
    /// fixed for the life of a record.
    pub fn update(&self, id: u64, rate: Decimal, active: bool) -> Result<(), StoreError> {
        let updated = {
            let mut table = self.write_table();
            let rule = table
                .records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(StoreError::NotFound(id))?;
            rule.rate = rate;
            rule.active = active;
            rule.clone()
        };
        self.notify(Mutation::Updated, &updated);
        Ok(())
    }

    pub fn delete(&self, id: u64) -> Result<RateRule, StoreError> {
        let removed = {
            let mut table = self.write_table();
            let pos = table
                .records
                .iter()
                .position(|r| r.id == id)
                .ok_or(StoreError::NotFound(id))?;
            table.records.remove(pos)
        };
        self.notify(Mutation::Deleted, &removed);
        Ok(removed)
    }

    /// Change a rate without emitting a mutation event, like a bulk update
    /// that bypasses persistence hooks. Cached rates keep shadowing the
    /// store until their ttl expires.
    pub fn update_untracked(&self, id: u64, rate: Decimal) -> Result<(), StoreError> {
        let mut table = self.write_table();
        let rule = table
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        rule.rate = rate;
        Ok(())
    }

    fn notify(&self, mutation: Mutation, rule: &RateRule) {
        log::debug!("Rule {} {} ({})", rule.id, mutation, rule.rule_type);
        self.listeners.each(|l| l.on_rule_changed(rule.rule_type));
    }

    fn read_table(&self) -> std::sync::RwLockReadGuard<'_, Table<RateRule>> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_table(&self) -> std::sync::RwLockWriteGuard<'_, Table<RateRule>> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RuleStore for MemoryRuleStore {
    /// Most specific matching rule wins; ties go to the earliest created.
    fn find_active_rule(
        &self,
        rule_type: RuleType,
        sector: Option<Sector>,
        state: Option<&str>,
    ) -> Result<Option<Decimal>, StoreError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        let table = self.read_table();
        let best = table
            .records
            .iter()
            .filter(|r| r.matches(rule_type, sector, state))
            .min_by_key(|r| (std::cmp::Reverse(r.specificity()), r.id));
        Ok(best.map(|r| r.rate))
    }
}

/// In-memory suggestion store
pub struct MemorySuggestionStore {
    table: RwLock<Table<SuggestionEntry>>,
    available: AtomicBool,
    listeners: Listeners,
}

impl Default for MemorySuggestionStore {
    fn default() -> Self {
        MemorySuggestionStore {
            table: RwLock::new(Table::default()),
            available: AtomicBool::new(true),
            listeners: Listeners::default(),
        }
    }
}

impl MemorySuggestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load suggestions from CSV with columns `sector,impact,text`.
    /// Loading does not emit mutation events.
    pub fn read_csv<R: Read>(reader: R) -> anyhow::Result<Self> {
        let store = Self::new();
        let mut rdr = csv::Reader::from_reader(reader);
        {
            let mut table = store.write_table();
            for result in rdr.deserialize() {
                let mut entry: SuggestionEntry = result?;
                table.next_id += 1;
                entry.id = table.next_id;
                table.records.push(entry);
            }
            log::info!("Read {} suggestions", table.records.len());
        }
        Ok(store)
    }

    pub fn subscribe(&self, listener: Arc<dyn MutationListener>) {
        self.listeners.add(listener);
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn entries(&self) -> Vec<SuggestionEntry> {
        self.read_table().records.clone()
    }

    pub fn create(&self, mut entry: SuggestionEntry) -> u64 {
        let id = {
            let mut table = self.write_table();
            table.next_id += 1;
            entry.id = table.next_id;
            table.records.push(entry.clone());
            entry.id
        };
        self.notify(Mutation::Created, &entry);
        id
    }

    /// Replace the text of a suggestion; sector and impact are fixed
    pub fn update(&self, id: u64, text: impl Into<String>) -> Result<(), StoreError> {
        let updated = {
            let mut table = self.write_table();
            let entry = table
                .records
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or(StoreError::NotFound(id))?;
            entry.text = text.into();
            entry.clone()
        };
        self.notify(Mutation::Updated, &updated);
        Ok(())
    }

    pub fn delete(&self, id: u64) -> Result<SuggestionEntry, StoreError> {
        let removed = {
            let mut table = self.write_table();
            let pos = table
                .records
                .iter()
                .position(|e| e.id == id)
                .ok_or(StoreError::NotFound(id))?;
            table.records.remove(pos)
        };
        self.notify(Mutation::Deleted, &removed);
        Ok(removed)
    }

    fn notify(&self, mutation: Mutation, entry: &SuggestionEntry) {
        log::debug!(
            "Suggestion {} {} ({}/{})",
            entry.id,
            mutation,
            entry.sector,
            entry.impact
        );
        self.listeners
            .each(|l| l.on_suggestion_changed(entry.sector, entry.impact));
    }

    fn read_table(&self) -> std::sync::RwLockReadGuard<'_, Table<SuggestionEntry>> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_table(&self) -> std::sync::RwLockWriteGuard<'_, Table<SuggestionEntry>> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SuggestionStore for MemorySuggestionStore {
    fn find_suggestions(
        &self,
        sector: Sector,
        impact: ImpactClassification,
    ) -> Result<Vec<String>, StoreError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        let table = self.read_table();
        Ok(table
            .records
            .iter()
            .filter(|e| e.sector == sector && e.impact == impact)
            .map(|e| e.text.clone())
            .collect())
    }
}
