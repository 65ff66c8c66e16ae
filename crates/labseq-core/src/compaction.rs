//! Rate-limited store compaction for long segmented fills.
//!
//! Retention rules:
//! - indices 0..=3 are never evicted (enforced by the store);
//! - at least `window` entries behind the current index are kept, and
//!   `window >= 4`, so the newest seed window always survives;
//! - nothing at or above the seed start of the next unscheduled block is
//!   evicted;
//! - the eviction horizon only moves forward.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{BASE_LEN, DEFAULT_COMPACTION_INTERVAL, SEED_WIDTH};
use crate::evaluator::LabseqError;
use crate::store::ValueStore;

/// How aggressively the segmented evaluator trims the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactionPolicy {
    /// Entries kept behind the index currently being written.
    pub window: u64,
    /// Indices written between two compaction attempts.
    pub interval: u64,
}

impl CompactionPolicy {
    /// Create a policy keeping `window` entries, compacting every
    /// [`DEFAULT_COMPACTION_INTERVAL`] indices.
    #[must_use]
    pub fn new(window: u64) -> Self {
        Self {
            window,
            interval: DEFAULT_COMPACTION_INTERVAL,
        }
    }

    /// Override the compaction interval.
    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval;
        self
    }

    /// Reject windows that could evict a live seed and empty intervals.
    pub fn validate(&self) -> Result<(), LabseqError> {
        if self.window < SEED_WIDTH as u64 {
            return Err(LabseqError::Config(format!(
                "compaction window must be at least {SEED_WIDTH}, got {}",
                self.window
            )));
        }
        if self.interval == 0 {
            return Err(LabseqError::Config(
                "compaction interval must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Per-fill compaction state shared by the blocks of one segmented run.
pub struct Compactor {
    policy: CompactionPolicy,
    floor: AtomicU64,
    horizon: AtomicU64,
    runs: AtomicU64,
}

impl Compactor {
    #[must_use]
    pub fn new(policy: CompactionPolicy) -> Self {
        Self {
            policy,
            floor: AtomicU64::new(u64::MAX),
            horizon: AtomicU64::new(BASE_LEN),
            runs: AtomicU64::new(0),
        }
    }

    /// Protect every index at or above `index` (seed start of the next
    /// unscheduled block). `u64::MAX` lifts the protection.
    pub fn retain_from(&self, index: u64) {
        self.floor.store(index, Ordering::Release);
    }

    /// Compact if `current` falls on the interval and the horizon advances.
    ///
    /// Returns the number of evicted entries.
    pub fn maybe_compact(&self, store: &dyn ValueStore, current: u64) -> usize {
        if current % self.policy.interval != 0 {
            return 0;
        }
        let keep_above = current
            .saturating_sub(self.policy.window)
            .min(self.floor.load(Ordering::Acquire));
        if keep_above <= BASE_LEN {
            return 0;
        }
        if self.horizon.fetch_max(keep_above, Ordering::AcqRel) >= keep_above {
            return 0;
        }

        let removed = store.compact(keep_above);
        self.runs.fetch_add(1, Ordering::Relaxed);
        debug!(current, keep_above, removed, "compacted value store");
        removed
    }

    /// Number of compaction passes executed.
    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }
}
