//! # Shared Match Cache
//!
//! Remembers, per archetype, whether each constraint group passed:
//!
//! ```text
//! archetype#3 ─┬─ Any:  { ",1,4" -> true }
//!              ├─ All:  { ",1"   -> true, ",1,9" -> false }
//!              └─ None: { ",7"   -> true }
//! ```
//!
//! One cache is shared by every query of a world, so the second query asking
//! about the same component set on the same archetype never rescans.
//!
//! ## Soundness
//!
//! An entry is written at most once and never changes. That is only correct
//! because an archetype's composition is fixed for its lifetime. Handles of
//! retired archetypes must be evicted (or never reused) before their entries
//! could be read for a different composition.
//!
//! Every eviction bumps an epoch counter. Queries compare it against the
//! epoch their local verdicts were recorded under and drop those verdicts
//! when it moved, so retired handles do not pile up in long-lived queries.
//!
//! ## Thread Safety
//!
//! Reads take a shared lock. Writes are insert-if-absent: two threads racing
//! on the same missing entry computed the same answer, so whichever write
//! lands first stands.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tessera_core::ArchetypeId;
use tracing::{debug, trace};

use crate::key::{CacheKey, ConstraintGroup};

/// Cached group outcomes for one archetype.
#[derive(Debug, Default)]
struct ArchetypeRecord {
    any: HashMap<CacheKey, bool>,
    all: HashMap<CacheKey, bool>,
    none: HashMap<CacheKey, bool>,
}

impl ArchetypeRecord {
    fn group(&self, group: ConstraintGroup) -> &HashMap<CacheKey, bool> {
        match group {
            ConstraintGroup::Any => &self.any,
            ConstraintGroup::All => &self.all,
            ConstraintGroup::None => &self.none,
        }
    }

    fn group_mut(&mut self, group: ConstraintGroup) -> &mut HashMap<CacheKey, bool> {
        match group {
            ConstraintGroup::Any => &mut self.any,
            ConstraintGroup::All => &mut self.all,
            ConstraintGroup::None => &mut self.none,
        }
    }

    fn len(&self) -> usize {
        self.any.len() + self.all.len() + self.none.len()
    }
}

/// Hit/miss counters of a [`MatchCache`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to scan the archetype.
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache (0.0 to 1.0).
    #[must_use]
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            // Precision loss only past 2^52 lookups.
            #[allow(clippy::cast_precision_loss)]
            let ratio = self.hits as f64 / total as f64;
            ratio
        }
    }
}

/// Process-wide (per world) cache of group outcomes, keyed by archetype.
#[derive(Debug, Default)]
pub struct MatchCache {
    records: RwLock<HashMap<ArchetypeId, ArchetypeRecord>>,
    hits: AtomicU64,
    misses: AtomicU64,
    epoch: AtomicU64,
}

impl MatchCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the record for `archetype` if it does not exist yet.
    pub fn bootstrap(&self, archetype: ArchetypeId) {
        if self.records.read().contains_key(&archetype) {
            return;
        }
        self.records.write().entry(archetype).or_default();
    }

    /// Cached outcome of `group` under `key`, if known.
    #[must_use]
    pub fn lookup(&self, archetype: ArchetypeId, group: ConstraintGroup, key: &CacheKey) -> Option<bool> {
        self.records
            .read()
            .get(&archetype)
            .and_then(|record| record.group(group).get(key).copied())
    }

    /// Stores `value` unless an entry exists. Returns the stored value.
    pub fn insert_if_absent(
        &self,
        archetype: ArchetypeId,
        group: ConstraintGroup,
        key: &CacheKey,
        value: bool,
    ) -> bool {
        let mut records = self.records.write();
        let stored = *records
            .entry(archetype)
            .or_default()
            .group_mut(group)
            .entry(key.clone())
            .or_insert(value);
        debug_assert_eq!(stored, value, "cached outcome changed for {archetype} {group} {key}");
        stored
    }

    /// Returns the cached outcome, computing and storing it on a miss.
    ///
    /// `compute` runs without any lock held, so it may read this cache.
    pub fn get_or_compute<F>(
        &self,
        archetype: ArchetypeId,
        group: ConstraintGroup,
        key: &CacheKey,
        compute: F,
    ) -> bool
    where
        F: FnOnce() -> bool,
    {
        if let Some(valid) = self.lookup(archetype, group, key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return valid;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let valid = compute();
        trace!(%archetype, %group, %key, valid, "computed group outcome");
        self.insert_if_absent(archetype, group, key, valid)
    }

    /// Drops every entry for `archetype`. Returns whether it had a record.
    ///
    /// Call when the archetype is destroyed.
    pub fn evict(&self, archetype: ArchetypeId) -> bool {
        let removed = self.records.write().remove(&archetype);
        if let Some(record) = &removed {
            self.epoch.fetch_add(1, Ordering::Release);
            debug!(%archetype, entries = record.len(), "evicted archetype from match cache");
        }
        removed.is_some()
    }

    /// Drops everything and resets the counters.
    pub fn clear(&self) {
        self.records.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.epoch.fetch_add(1, Ordering::Release);
    }

    /// Eviction counter. Changes whenever entries were dropped.
    #[inline]
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Number of archetypes with a record.
    #[must_use]
    pub fn archetype_count(&self) -> usize {
        self.records.read().len()
    }

    /// Number of cached outcomes across all archetypes and groups.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.records.read().values().map(ArchetypeRecord::len).sum()
    }

    /// Snapshot of the hit/miss counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tessera_core::ComponentTypeId;

    fn key(raw: &[u32]) -> CacheKey {
        CacheKey::from_ids(raw.iter().copied().map(ComponentTypeId::new)).unwrap()
    }

    #[test]
    fn test_lookup_miss_then_hit() {
        let cache = MatchCache::new();
        let arch = ArchetypeId::new(0);
        let k = key(&[1, 2]);

        assert_eq!(cache.lookup(arch, ConstraintGroup::All, &k), None);
        assert!(cache.get_or_compute(arch, ConstraintGroup::All, &k, || true));
        assert!(cache.get_or_compute(arch, ConstraintGroup::All, &k, || unreachable!()));

        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
        assert!((cache.stats().hit_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_groups_are_separate() {
        let cache = MatchCache::new();
        let arch = ArchetypeId::new(0);
        let k = key(&[3]);

        cache.insert_if_absent(arch, ConstraintGroup::All, &k, true);
        assert_eq!(cache.lookup(arch, ConstraintGroup::All, &k), Some(true));
        assert_eq!(cache.lookup(arch, ConstraintGroup::Any, &k), None);
        assert_eq!(cache.lookup(arch, ConstraintGroup::None, &k), None);
    }

    #[test]
    fn test_first_write_wins() {
        let cache = MatchCache::new();
        let arch = ArchetypeId::new(0);
        let k = key(&[3]);

        assert!(!cache.insert_if_absent(arch, ConstraintGroup::None, &k, false));
        assert!(!cache.get_or_compute(arch, ConstraintGroup::None, &k, || true));
    }

    #[test]
    fn test_bootstrap_and_evict() {
        let cache = MatchCache::new();
        let a = ArchetypeId::new(1);
        let b = ArchetypeId::new(2);

        cache.bootstrap(a);
        cache.bootstrap(a);
        cache.insert_if_absent(b, ConstraintGroup::Any, &key(&[1]), true);
        assert_eq!(cache.archetype_count(), 2);
        assert_eq!(cache.entry_count(), 1);

        let epoch = cache.epoch();
        assert!(cache.evict(b));
        assert_eq!(cache.epoch(), epoch + 1);
        assert!(!cache.evict(b));
        assert_eq!(cache.epoch(), epoch + 1);
        assert_eq!(cache.lookup(b, ConstraintGroup::Any, &key(&[1])), None);
        assert_eq!(cache.archetype_count(), 1);

        cache.clear();
        assert_eq!(cache.archetype_count(), 0);
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_concurrent_fill_agrees() {
        let cache = Arc::new(MatchCache::new());
        let k = key(&[1, 2, 3]);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                let k = k.clone();
                std::thread::spawn(move || {
                    for i in 0..64u32 {
                        let arch = ArchetypeId::new(i);
                        let expected = i % 3 == 0;
                        let got = cache.get_or_compute(arch, ConstraintGroup::All, &k, || expected);
                        assert_eq!(got, expected, "thread {t} archetype {i}");
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.archetype_count(), 64);
        assert_eq!(cache.entry_count(), 64);
        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, 8 * 64);
    }
}
