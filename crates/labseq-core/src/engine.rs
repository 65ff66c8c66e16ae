//! The engine façade: input validation, strategy selection, delegation.

use std::sync::Arc;

use num_bigint::BigUint;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info};

use crate::constants::MAX_INDEX;
use crate::evaluator::{Evaluators, LabseqError};
use crate::observer::{NoOpObserver, ProgressObserver};
use crate::options::EngineOptions;
use crate::pool::build_worker_pool;
use crate::progress::CancellationToken;
use crate::selector::{Strategy, StrategySelector};
use crate::store::{MemoStore, ValueStore};

/// A request for one sequence term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// Requested index; negative values are rejected.
    pub n: i64,
    /// Strategy override; `None` selects by threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
}

impl EvaluationRequest {
    /// Threshold-selected request for index `n`.
    #[must_use]
    pub fn new(n: i64) -> Self {
        Self { n, strategy: None }
    }

    /// Force a specific strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
}

/// The computed term, serialized as `{"n": .., "result": "..", "strategy": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    #[serde(rename = "n")]
    pub index: u64,
    #[serde(rename = "result", serialize_with = "serialize_decimal")]
    pub value: BigUint,
    pub strategy: Strategy,
}

fn serialize_decimal<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Check that `n` is a usable index.
pub fn validate_index(n: i64) -> Result<u64, LabseqError> {
    let index = u64::try_from(n)
        .map_err(|_| LabseqError::InvalidInput(format!("n must be non-negative, got {n}")))?;
    if index > MAX_INDEX {
        return Err(LabseqError::InvalidInput(format!(
            "n must not exceed {MAX_INDEX}, got {n}"
        )));
    }
    Ok(index)
}

/// Labseq evaluation engine over a shared value store.
pub struct Engine {
    options: EngineOptions,
    store: Arc<dyn ValueStore>,
    selector: StrategySelector,
    evaluators: Evaluators,
}

impl Engine {
    /// Engine with a fresh [`MemoStore`] and its own worker pool.
    pub fn new(options: EngineOptions) -> Result<Self, LabseqError> {
        Self::with_store(options, Arc::new(MemoStore::new()))
    }

    /// Engine over an existing store, with its own worker pool.
    pub fn with_store(
        options: EngineOptions,
        store: Arc<dyn ValueStore>,
    ) -> Result<Self, LabseqError> {
        let pool = build_worker_pool(options.workers)?;
        Self::from_parts(options, store, pool)
    }

    /// Engine over an existing store and worker pool.
    pub fn from_parts(
        options: EngineOptions,
        store: Arc<dyn ValueStore>,
        pool: Arc<ThreadPool>,
    ) -> Result<Self, LabseqError> {
        let options = options.normalize();
        options.validate()?;
        debug!(
            iterative = options.thresholds.iterative(),
            batched = options.thresholds.batched(),
            chunk_size = options.chunk_size,
            block_size = options.block_size,
            workers = pool.current_num_threads(),
            "engine configured"
        );
        Ok(Self {
            selector: StrategySelector::new(options.thresholds),
            evaluators: Evaluators::new(&options, pool),
            options,
            store,
        })
    }

    /// `value(n)`, with threshold-based strategy selection.
    pub fn calculate(&self, n: i64) -> Result<BigUint, LabseqError> {
        self.evaluate(
            &EvaluationRequest::new(n),
            &CancellationToken::new(),
            &NoOpObserver::new(),
        )
        .map(|result| result.value)
    }

    /// Full form of [`Engine::calculate`]: strategy override, cancellation
    /// and progress reporting.
    pub fn evaluate(
        &self,
        request: &EvaluationRequest,
        cancel: &CancellationToken,
        observer: &dyn ProgressObserver,
    ) -> Result<EvaluationResult, LabseqError> {
        let index = validate_index(request.n)?;
        let strategy = request
            .strategy
            .unwrap_or_else(|| self.selector.select(index));

        if let Some(value) = self.store.get(index) {
            debug!(n = index, "store hit");
            return Ok(EvaluationResult {
                index,
                value: Arc::unwrap_or_clone(value),
                strategy,
            });
        }

        info!(n = index, strategy = %strategy, "evaluating");
        let value = self
            .evaluators
            .get(strategy)
            .fill(self.store.as_ref(), index, cancel, observer)?;
        info!(n = index, strategy = %strategy, bits = value.bits(), "evaluation complete");

        Ok(EvaluationResult {
            index,
            value: Arc::unwrap_or_clone(value),
            strategy,
        })
    }

    /// Strategy the selector picks for `n`.
    #[must_use]
    pub fn select(&self, n: u64) -> Strategy {
        self.selector.select(n)
    }

    /// The shared store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ValueStore> {
        &self.store
    }

    /// Normalized options.
    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }
}
