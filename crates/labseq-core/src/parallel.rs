//! Naive parallel evaluator: one task per missing index on the worker pool.
//!
//! Submitting every index at once lets the task for `i` run before the
//! tasks producing `i-4` or `i-3` have finished. Tasks are therefore
//! submitted in dependency-respecting waves of [`WAVE_WIDTH`] indices:
//! every index in a wave only depends on indices below the wave, and each
//! wave is joined before the next one starts. The recurrence caps useful
//! parallelism at three tasks, so this strategy is never chosen by the
//! threshold selector.

use std::sync::Arc;

use num_bigint::BigUint;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use rayon::ThreadPool;
use tracing::debug;

use crate::constants::WAVE_WIDTH;
use crate::evaluator::{Evaluator, LabseqError};
use crate::observer::ProgressObserver;
use crate::progress::{CancellationToken, ProgressUpdate};
use crate::recurrence::next_value;
use crate::seed::{lookup_or_recompute, resume_index};
use crate::selector::Strategy;
use crate::store::ValueStore;

/// Waves between two progress reports.
const WAVES_PER_REPORT: u64 = 256;

/// Wave-scheduled fan-out of single-index tasks.
pub struct NaiveParallelEvaluator {
    pool: Arc<ThreadPool>,
}

impl NaiveParallelEvaluator {
    #[must_use]
    pub fn new(pool: Arc<ThreadPool>) -> Self {
        Self { pool }
    }

    fn compute_index(store: &dyn ValueStore, i: u64) -> Result<(), LabseqError> {
        let a = lookup_or_recompute(store, i - 4)?;
        let b = lookup_or_recompute(store, i - 3)?;
        store.put(i, Arc::new(next_value(&a, &b)));
        Ok(())
    }
}

impl Evaluator for NaiveParallelEvaluator {
    fn fill(
        &self,
        store: &dyn ValueStore,
        n: u64,
        cancel: &CancellationToken,
        observer: &dyn ProgressObserver,
    ) -> Result<Arc<BigUint>, LabseqError> {
        if let Some(value) = store.get(n) {
            return Ok(value);
        }

        let start = resume_index(store, n);
        let total = n - start + 1;
        debug!(start, n, wave_width = WAVE_WIDTH, "naive parallel fill");

        let mut wave_start = start;
        let mut waves = 0u64;
        while wave_start <= n {
            cancel.checkpoint()?;
            let wave_end = (wave_start + WAVE_WIDTH - 1).min(n);
            self.pool.install(|| {
                (wave_start..=wave_end)
                    .into_par_iter()
                    .try_for_each(|i| Self::compute_index(store, i))
            })?;

            waves += 1;
            if waves % WAVES_PER_REPORT == 0 {
                observer.on_progress(&ProgressUpdate::new(
                    self.name(),
                    wave_end - start + 1,
                    total,
                ));
            }
            wave_start = wave_end + 1;
        }

        observer.on_progress(&ProgressUpdate::done(self.name()));
        lookup_or_recompute(store, n)
    }

    fn strategy(&self) -> Strategy {
        Strategy::NaiveParallel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoOpObserver;
    use crate::pool::build_worker_pool;
    use crate::sequential::SequentialEvaluator;
    use crate::store::MemoStore;

    fn evaluator() -> NaiveParallelEvaluator {
        NaiveParallelEvaluator::new(build_worker_pool(4).unwrap())
    }

    fn fill_with(eval: &dyn Evaluator, store: &MemoStore, n: u64) -> Arc<BigUint> {
        eval.fill(store, n, &CancellationToken::new(), &NoOpObserver::new())
            .unwrap()
    }

    #[test]
    fn known_values() {
        let store = MemoStore::new();
        let eval = evaluator();
        assert_eq!(*fill_with(&eval, &store, 10), BigUint::from(3u32));
        assert_eq!(*fill_with(&eval, &store, 7), BigUint::from(2u32));
    }

    #[test]
    fn matches_sequential() {
        let eval = evaluator();
        for n in [4u64, 5, 6, 7, 100, 1_001, 3_000] {
            let expected = fill_with(&SequentialEvaluator::new(), &MemoStore::new(), n);
            let got = fill_with(&eval, &MemoStore::new(), n);
            assert_eq!(got, expected, "n = {n}");
        }
    }

    #[test]
    fn leaves_dense_prefix() {
        let store = MemoStore::new();
        fill_with(&evaluator(), &store, 200);
        for i in 0..=200 {
            assert!(store.contains(i), "index {i} missing");
        }
    }

    #[test]
    fn cancellation_before_first_wave() {
        let store = MemoStore::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = evaluator().fill(&store, 100, &cancel, &NoOpObserver::new());
        assert_eq!(result, Err(LabseqError::Cancelled));
    }
}
