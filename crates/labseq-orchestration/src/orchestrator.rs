//! Core orchestration: running one or several strategies and comparing results.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{info, warn};

use labseq_core::engine::{Engine, EvaluationRequest};
use labseq_core::evaluator::LabseqError;
use labseq_core::observer::{NoOpObserver, ProgressObserver};
use labseq_core::options::EngineOptions;
use labseq_core::pool::build_worker_pool;
use labseq_core::progress::CancellationToken;
use labseq_core::selector::Strategy;
use labseq_core::store::MemoStore;

use crate::interfaces::CalculationResult;

/// Run every selection for index `n`.
pub fn execute_calculations(
    selections: &[Option<Strategy>],
    n: i64,
    opts: &EngineOptions,
    cancel: &CancellationToken,
    timeout: Option<Duration>,
) -> Result<Vec<CalculationResult>, LabseqError> {
    execute_calculations_with_observer(selections, n, opts, cancel, timeout, &NoOpObserver::new())
}

/// Run every selection for index `n`, reporting progress to `observer`.
///
/// A single selection runs on one engine. Several selections run in
/// parallel, each on its own fresh store over one shared worker pool, so
/// no strategy can reuse values another one produced.
pub fn execute_calculations_with_observer(
    selections: &[Option<Strategy>],
    n: i64,
    opts: &EngineOptions,
    cancel: &CancellationToken,
    timeout: Option<Duration>,
    observer: &dyn ProgressObserver,
) -> Result<Vec<CalculationResult>, LabseqError> {
    let token = match timeout {
        Some(timeout) => cancel.with_deadline(timeout),
        None => cancel.clone(),
    };

    if let [selection] = selections {
        let engine = Engine::new(opts.clone())?;
        return Ok(vec![run_one(&engine, *selection, n, &token, observer)]);
    }

    let pool = build_worker_pool(opts.workers)?;
    let engines = selections
        .iter()
        .map(|_| Engine::from_parts(opts.clone(), Arc::new(MemoStore::new()), Arc::clone(&pool)))
        .collect::<Result<Vec<_>, _>>()?;

    info!(n, strategies = selections.len(), "running strategies in parallel");
    let runs: Vec<(usize, Option<Strategy>)> = selections.iter().copied().enumerate().collect();
    let results = runs
        .par_iter()
        .map(|&(i, selection)| run_one(&engines[i], selection, n, &token, observer))
        .collect();
    Ok(results)
}

fn run_one(
    engine: &Engine,
    selection: Option<Strategy>,
    n: i64,
    cancel: &CancellationToken,
    observer: &dyn ProgressObserver,
) -> CalculationResult {
    let request = EvaluationRequest { n, strategy: selection };
    let start = Instant::now();
    let outcome = engine.evaluate(&request, cancel, observer);
    let duration = start.elapsed();

    let strategy = match (&outcome, selection) {
        (Ok(result), _) => result.strategy.name().to_string(),
        (Err(_), Some(strategy)) => strategy.name().to_string(),
        (Err(_), None) => "Auto".to_string(),
    };
    if let Err(e) = &outcome {
        warn!(strategy = %strategy, error = %e, "evaluation failed");
    }
    CalculationResult {
        strategy,
        outcome,
        duration,
    }
}

/// Analyze comparison results for mismatches.
pub fn analyze_comparison_results(results: &[CalculationResult]) -> Result<(), LabseqError> {
    let mut values = results
        .iter()
        .filter_map(CalculationResult::evaluation)
        .map(|e| &e.value);

    let Some(first) = values.next() else {
        return Err(LabseqError::Computation("no valid results".into()));
    };
    if values.any(|value| value != first) {
        return Err(LabseqError::Mismatch);
    }
    Ok(())
}
