//! Evaluator trait, error type, and the closed set of evaluation strategies.
//!
//! `Evaluator` is the internal trait every strategy implements.
//! `Evaluators` owns one instance of each strategy and resolves a
//! [`Strategy`] with an exhaustive match.

use std::sync::Arc;

use num_bigint::BigUint;
use rayon::ThreadPool;

use crate::chunked::ChunkedEvaluator;
use crate::observer::ProgressObserver;
use crate::options::EngineOptions;
use crate::parallel::NaiveParallelEvaluator;
use crate::progress::CancellationToken;
use crate::segmented::SegmentedEvaluator;
use crate::selector::Strategy;
use crate::sequential::SequentialEvaluator;
use crate::store::ValueStore;

/// Error type for Labseq evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LabseqError {
    /// The requested index is negative or outside the supported range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A worker failed or an internal invariant was violated.
    #[error("computation failure: {0}")]
    Computation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Calculation was cancelled.
    #[error("calculation cancelled")]
    Cancelled,

    /// Calculation timed out.
    #[error("calculation timed out after {0}")]
    Timeout(String),

    /// Results from different strategies don't match.
    #[error("result mismatch between strategies")]
    Mismatch,
}

/// Internal trait for evaluation strategies.
///
/// `fill` makes sure every index up to `n` that the strategy needs is in the
/// store and returns `value(n)`.
pub trait Evaluator: Send + Sync {
    /// Fill the store up to `n` and return the value at `n`.
    fn fill(
        &self,
        store: &dyn ValueStore,
        n: u64,
        cancel: &CancellationToken,
        observer: &dyn ProgressObserver,
    ) -> Result<Arc<BigUint>, LabseqError>;

    /// The strategy this evaluator implements.
    fn strategy(&self) -> Strategy;

    /// Get the name of this evaluator.
    fn name(&self) -> &'static str {
        self.strategy().name()
    }
}

/// One evaluator per strategy, sharing a worker pool.
pub struct Evaluators {
    sequential: SequentialEvaluator,
    chunked: ChunkedEvaluator,
    naive_parallel: NaiveParallelEvaluator,
    segmented: SegmentedEvaluator,
}

impl Evaluators {
    /// Build all evaluators from normalized options.
    #[must_use]
    pub fn new(opts: &EngineOptions, pool: Arc<ThreadPool>) -> Self {
        Self {
            sequential: SequentialEvaluator::new(),
            chunked: ChunkedEvaluator::new(opts.chunk_size),
            naive_parallel: NaiveParallelEvaluator::new(Arc::clone(&pool)),
            segmented: SegmentedEvaluator::new(opts.block_size, opts.compaction, pool),
        }
    }

    /// Resolve a strategy to its evaluator.
    #[must_use]
    pub fn get(&self, strategy: Strategy) -> &dyn Evaluator {
        match strategy {
            Strategy::Sequential => &self.sequential,
            Strategy::Chunked => &self.chunked,
            Strategy::NaiveParallel => &self.naive_parallel,
            Strategy::Segmented => &self.segmented,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::build_worker_pool;

    #[test]
    fn error_display() {
        let err = LabseqError::InvalidInput("n must be non-negative".into());
        assert_eq!(err.to_string(), "invalid input: n must be non-negative");

        let err = LabseqError::Cancelled;
        assert_eq!(err.to_string(), "calculation cancelled");
    }

    #[test]
    fn evaluators_resolve_every_strategy() {
        let opts = EngineOptions::default();
        let pool = build_worker_pool(2).unwrap();
        let evaluators = Evaluators::new(&opts, pool);
        for strategy in Strategy::ALL {
            assert_eq!(evaluators.get(strategy).strategy(), strategy);
            assert_eq!(evaluators.get(strategy).name(), strategy.name());
        }
    }
}
