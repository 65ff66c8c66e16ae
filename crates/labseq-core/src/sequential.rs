//! Sequential evaluator: fills missing indices one by one, in order.
//!
//! This is the reference strategy the others must agree with.

use std::sync::Arc;

use num_bigint::BigUint;
use tracing::debug;

use crate::evaluator::{Evaluator, LabseqError};
use crate::observer::ProgressObserver;
use crate::progress::{CancellationToken, ProgressUpdate};
use crate::recurrence::next_value;
use crate::seed::{lookup_or_recompute, resume_index};
use crate::selector::Strategy;
use crate::store::ValueStore;

/// Fills `resume..=n` strictly in increasing index order.
pub struct SequentialEvaluator;

impl SequentialEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for SequentialEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for SequentialEvaluator {
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
        cancel.checkpoint()?;

        let start = resume_index(store, n);
        debug!(start, n, "sequential fill");

        let mut last = None;
        for i in start..=n {
            let a = lookup_or_recompute(store, i - 4)?;
            let b = lookup_or_recompute(store, i - 3)?;
            let value = Arc::new(next_value(&a, &b));
            store.put(i, Arc::clone(&value));
            last = Some(value);
        }

        observer.on_progress(&ProgressUpdate::done(self.name()));
        last.ok_or_else(|| LabseqError::Computation(format!("index {n} was not produced")))
    }

    fn strategy(&self) -> Strategy {
        Strategy::Sequential
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LABSEQ_TABLE;
    use crate::observer::NoOpObserver;
    use crate::store::MemoStore;

    fn fill(store: &MemoStore, n: u64) -> Result<Arc<BigUint>, LabseqError> {
        SequentialEvaluator::new().fill(store, n, &CancellationToken::new(), &NoOpObserver::new())
    }

    #[test]
    fn known_values() {
        let store = MemoStore::new();
        assert_eq!(*fill(&store, 4).unwrap(), BigUint::from(1u32));
        assert_eq!(*fill(&store, 7).unwrap(), BigUint::from(2u32));
        assert_eq!(*fill(&store, 10).unwrap(), BigUint::from(3u32));
    }

    #[test]
    fn base_indices_are_store_hits() {
        let store = MemoStore::new();
        for (i, expected) in [0u32, 1, 0, 1].iter().enumerate() {
            assert_eq!(*fill(&store, i as u64).unwrap(), BigUint::from(*expected));
        }
        assert_eq!(store.stats().writes, 0);
    }

    #[test]
    fn fills_every_index_up_to_n() {
        let store = MemoStore::new();
        fill(&store, 63).unwrap();
        for i in 0..64u64 {
            assert_eq!(
                *store.get(i).unwrap(),
                BigUint::from(LABSEQ_TABLE[i as usize]),
                "value({i})"
            );
        }
    }

    #[test]
    fn resumes_from_previous_fill() {
        let store = MemoStore::new();
        fill(&store, 30).unwrap();
        let writes = store.stats().writes;
        fill(&store, 40).unwrap();
        assert_eq!(store.stats().writes - writes, 10);
    }

    #[test]
    fn cancelled_before_start() {
        let store = MemoStore::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = SequentialEvaluator::new().fill(&store, 50, &cancel, &NoOpObserver::new());
        assert_eq!(result, Err(LabseqError::Cancelled));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn strategy_name() {
        assert_eq!(SequentialEvaluator::default().name(), "Sequential");
    }
}
