//! # labseq-core
//!
//! Evaluation engine for the Labseq sequence
//! `value(i) = value(i-4) + value(i-3)` with base values `[0, 1, 0, 1]`.
//! A shared memo store backs four interchangeable strategies: sequential,
//! chunked, wave-scheduled naive parallel, and a segmented block pipeline.

pub mod chunked;
pub mod compaction;
pub mod constants;
pub mod engine;
pub mod evaluator;
pub mod iterator;
pub mod observer;
pub mod options;
pub mod parallel;
pub mod pool;
pub mod progress;
pub mod recurrence;
pub mod seed;
pub mod segmented;
pub mod selector;
pub mod sequential;
pub mod store;
pub mod transition;

// Re-exports
pub use compaction::CompactionPolicy;
pub use constants::{exit_codes, BASE_VALUES, LABSEQ_TABLE, MAX_INDEX};
pub use engine::{Engine, EvaluationRequest, EvaluationResult};
pub use evaluator::{Evaluator, Evaluators, LabseqError};
pub use observer::{ChannelObserver, LoggingObserver, NoOpObserver, ProgressObserver};
pub use options::EngineOptions;
pub use progress::{CancellationToken, ProgressUpdate};
pub use selector::{Strategy, StrategySelector, Thresholds};
pub use store::{MemoStore, StoreStats, ValueStore};

use num_bigint::BigUint;

/// Compute `value(n)` without an engine or a shared store.
///
/// Jumps straight to `n` with the companion matrix. For memoization,
/// strategy selection, progress or cancellation, use [`Engine`].
///
/// # Example
/// ```
/// assert_eq!(labseq_core::labseq(10).to_string(), "3");
/// assert_eq!(labseq_core::labseq(100).to_string(), "182376579");
/// ```
#[must_use]
pub fn labseq(n: u64) -> BigUint {
    iterator::LabseqIterator::from_index(n)
        .next()
        .map(|(_, value)| value)
        .unwrap_or_default()
}
