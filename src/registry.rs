//! Rule registry with copy-on-write snapshot publication.
//!
//! # Invariants
//! - Readers only ever observe a fully built [`RegistrySnapshot`]; writers build
//!   a new snapshot off to the side and swap the `Arc` under the write lock.
//! - The facet universe only grows, in first-seen order, without duplicates.
//! - A rule name keeps the sequence number of its first registration, so
//!   replacing a rule does not move it among rules sharing the same `order`.
//!
//! # Design Notes
//! - Writers serialize on the lock; concurrent writers are not raced against
//!   each other beyond that.
//! - Enabled rules are sorted once per write, so classification walks a
//!   prebuilt slice.

use std::sync::{Arc, PoisonError, RwLock};

use ahash::{AHashMap, AHashSet};
use tracing::{debug, warn};

use crate::api::{ArchiveAllowList, MediaTypeRule};
use crate::matcher::{CompiledRule, RuleError};

#[derive(Clone, Debug)]
struct Slot {
    seq: u64,
    rule: Arc<CompiledRule>,
}

/// Immutable view of the registry at one point in time.
#[derive(Clone, Debug, Default)]
pub struct RegistrySnapshot {
    slots: AHashMap<String, Slot>,
    ordered: Vec<Arc<CompiledRule>>,
    allow_list: Option<Arc<ArchiveAllowList>>,
    universe: Vec<String>,
    universe_index: AHashSet<String>,
    next_seq: u64,
    generation: u64,
}

impl RegistrySnapshot {
    /// Enabled rules, ascending by `order`, ties broken by registration sequence.
    #[inline]
    pub fn ordered_rules(&self) -> &[Arc<CompiledRule>] {
        &self.ordered
    }

    #[inline]
    pub fn allow_list(&self) -> Option<&ArchiveAllowList> {
        self.allow_list.as_deref()
    }

    #[inline]
    pub fn facet_universe(&self) -> &[String] {
        &self.universe
    }

    pub fn rule(&self, name: &str) -> Option<&CompiledRule> {
        self.slots.get(name).map(|slot| slot.rule.as_ref())
    }

    /// Number of registered rules, enabled or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Incremented on every successful write.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn insert(&mut self, compiled: CompiledRule) {
        let name = compiled.name().to_owned();
        for facet in compiled.facets() {
            if self.universe_index.insert(facet.clone()) {
                self.universe.push(facet.clone());
            }
        }

        let seq = match self.slots.get(&name) {
            Some(prev) => {
                if prev.rule.rule() != compiled.rule() {
                    debug!(rule = %name, "replacing media type rule");
                }
                prev.seq
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                seq
            }
        };
        self.slots.insert(
            name,
            Slot {
                seq,
                rule: Arc::new(compiled),
            },
        );
        self.rebuild_order();
        self.generation += 1;
    }

    fn rebuild_order(&mut self) {
        let mut enabled: Vec<&Slot> = self
            .slots
            .values()
            .filter(|slot| slot.rule.is_enabled())
            .collect();
        enabled.sort_by_key(|slot| (slot.rule.order(), slot.seq));
        self.ordered = enabled.into_iter().map(|slot| slot.rule.clone()).collect();
    }
}

/// Holds the active rules, the archive allow-list and the facet universe.
///
/// Read-mostly: classification grabs an `Arc` snapshot and never holds the
/// lock while matching.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    current: RwLock<Arc<RegistrySnapshot>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot. Later registrations do not affect the returned value.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Insert or replace a rule by name.
    ///
    /// Malformed patterns poison the rule (it never matches) and are logged.
    /// An unnamed rule is dropped with a warning. Neither affects other rules.
    pub fn register_rule(&self, rule: MediaTypeRule) {
        if rule.name.trim().is_empty() {
            warn!("ignoring media type rule with an empty name");
            return;
        }
        debug!(rule = %rule.name, order = rule.order, enabled = rule.enabled, "registering media type rule");
        let compiled = CompiledRule::compile(rule);
        self.publish(|next| next.insert(compiled));
    }

    /// Strict variant of [`register_rule`](Self::register_rule): the registry is
    /// left untouched if the rule does not compile.
    pub fn try_register_rule(&self, rule: MediaTypeRule) -> Result<(), RuleError> {
        let compiled = CompiledRule::try_compile(rule)?;
        self.publish(|next| next.insert(compiled));
        Ok(())
    }

    /// Replace the active archive allow-list.
    pub fn register_allow_list(&self, list: ArchiveAllowList) {
        debug!(
            mimetypes = list.mimetypes.len(),
            extensions = list.extensions.len(),
            "replacing archive allow-list"
        );
        self.publish(|next| {
            next.allow_list = Some(Arc::new(list));
            next.generation += 1;
        });
    }

    /// Enabled rules ascending by `order`.
    pub fn rules_snapshot(&self) -> Vec<MediaTypeRule> {
        self.snapshot()
            .ordered_rules()
            .iter()
            .map(|rule| rule.rule().clone())
            .collect()
    }

    pub fn facet_universe(&self) -> Vec<String> {
        self.snapshot().facet_universe().to_vec()
    }

    pub fn allow_list(&self) -> Option<ArchiveAllowList> {
        self.snapshot().allow_list().cloned()
    }

    fn publish(&self, update: impl FnOnce(&mut RegistrySnapshot)) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = RegistrySnapshot::clone(&guard);
        update(&mut next);
        *guard = Arc::new(next);
    }
}
