//! Shared memo of computed Labseq values.
//!
//! `ValueStore` is the capability every evaluator reads and writes through.
//! `MemoStore` is the in-process implementation: a `BTreeMap` behind a
//! `parking_lot::RwLock`, pre-seeded with the base values. Each operation
//! holds the lock only for itself, so an entry is either fully present or
//! absent.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use num_bigint::BigUint;
use parking_lot::RwLock;

use crate::constants::{BASE_LEN, BASE_VALUES};

/// Concurrency-safe mapping from index to value.
pub trait ValueStore: Send + Sync {
    /// Get the value at `index`, if present.
    fn get(&self, index: u64) -> Option<Arc<BigUint>>;

    /// Store the value at `index`. Rewriting an index with the same value is harmless.
    fn put(&self, index: u64, value: Arc<BigUint>);

    /// Whether `index` is present. Does not count as a hit or a miss.
    fn contains(&self, index: u64) -> bool;

    /// Highest index currently present.
    fn max_known_index(&self) -> u64;

    /// Remove entries below `keep_above`, never touching indices 0..=3.
    ///
    /// Returns the number of evicted entries.
    fn compact(&self, keep_above: u64) -> usize;

    /// Number of entries currently held.
    fn len(&self) -> usize;

    /// Whether the store holds no entries (never true for a seeded store).
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of usage counters.
    fn stats(&self) -> StoreStats;
}

/// Usage counters of a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Lookups that found a value.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Values written.
    pub writes: u64,
    /// Entries removed by compaction.
    pub evictions: u64,
}

/// Atomic store statistics for lock-free updates.
#[derive(Default)]
struct AtomicStoreStats {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    evictions: AtomicU64,
}

impl AtomicStoreStats {
    fn snapshot(&self) -> StoreStats {
        StoreStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// In-memory value store seeded with the base values.
pub struct MemoStore {
    entries: RwLock<BTreeMap<u64, Arc<BigUint>>>,
    stats: AtomicStoreStats,
}

impl MemoStore {
    /// Create a store holding only the four base values.
    #[must_use]
    pub fn new() -> Self {
        let entries = (0u64..)
            .zip(BASE_VALUES)
            .map(|(i, v)| (i, Arc::new(BigUint::from(v))))
            .collect();
        Self {
            entries: RwLock::new(entries),
            stats: AtomicStoreStats::default(),
        }
    }
}

impl Default for MemoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueStore for MemoStore {
    fn get(&self, index: u64) -> Option<Arc<BigUint>> {
        let value = self.entries.read().get(&index).cloned();
        let counter = if value.is_some() {
            &self.stats.hits
        } else {
            &self.stats.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        value
    }

    fn put(&self, index: u64, value: Arc<BigUint>) {
        self.entries.write().insert(index, value);
        self.stats.writes.fetch_add(1, Ordering::Relaxed);
    }

    fn contains(&self, index: u64) -> bool {
        self.entries.read().contains_key(&index)
    }

    fn max_known_index(&self) -> u64 {
        self.entries
            .read()
            .last_key_value()
            .map_or(BASE_LEN - 1, |(&k, _)| k)
    }

    fn compact(&self, keep_above: u64) -> usize {
        if keep_above <= BASE_LEN {
            return 0;
        }
        let mut entries = self.entries.write();
        let mut kept = entries.split_off(&keep_above);
        let before = entries.len();
        entries.retain(|&k, _| k < BASE_LEN);
        let removed = before - entries.len();
        entries.append(&mut kept);
        drop(entries);

        self.stats
            .evictions
            .fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn stats(&self) -> StoreStats {
        self.stats.snapshot()
    }
}
