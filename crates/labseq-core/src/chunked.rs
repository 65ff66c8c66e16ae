//! Chunked evaluator: sequential fill split into fixed-size chunks.
//!
//! Each chunk boundary is a checkpoint for cancellation and progress
//! reporting; the output is identical to the sequential evaluator.

use std::sync::Arc;

use num_bigint::BigUint;
use tracing::debug;

use crate::constants::DEFAULT_CHUNK_SIZE;
use crate::evaluator::{Evaluator, LabseqError};
use crate::observer::ProgressObserver;
use crate::progress::{CancellationToken, ProgressUpdate};
use crate::recurrence::next_value;
use crate::seed::{lookup_or_recompute, resume_index};
use crate::selector::Strategy;
use crate::store::ValueStore;

/// Fills missing indices in chunks of `chunk_size`.
pub struct ChunkedEvaluator {
    chunk_size: u64,
}

impl ChunkedEvaluator {
    /// Create an evaluator with the given chunk size (0 selects the default).
    #[must_use]
    pub fn new(chunk_size: u64) -> Self {
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        Self { chunk_size }
    }

    /// Number of indices per chunk.
    #[must_use]
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    fn fill_chunk(
        store: &dyn ValueStore,
        start: u64,
        end: u64,
    ) -> Result<Arc<BigUint>, LabseqError> {
        let mut last = None;
        for i in start..=end {
            let a = lookup_or_recompute(store, i - 4)?;
            let b = lookup_or_recompute(store, i - 3)?;
            let value = Arc::new(next_value(&a, &b));
            store.put(i, Arc::clone(&value));
            last = Some(value);
        }
        last.ok_or_else(|| LabseqError::Computation(format!("empty chunk {start}..={end}")))
    }
}

impl Default for ChunkedEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl Evaluator for ChunkedEvaluator {
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
        debug!(start, n, chunk_size = self.chunk_size, "chunked fill");

        let mut chunk_start = start;
        let mut last = None;
        while chunk_start <= n {
            cancel.checkpoint()?;
            let chunk_end = chunk_start.saturating_add(self.chunk_size - 1).min(n);
            last = Some(Self::fill_chunk(store, chunk_start, chunk_end)?);
            observer.on_progress(&ProgressUpdate::new(
                self.name(),
                chunk_end - start + 1,
                total,
            ));
            chunk_start = chunk_end + 1;
        }

        observer.on_progress(&ProgressUpdate::done(self.name()));
        last.ok_or_else(|| LabseqError::Computation(format!("index {n} was not produced")))
    }

    fn strategy(&self) -> Strategy {
        Strategy::Chunked
    }
}
