//! Segmented pipeline evaluator.
//!
//! The missing range is split into fixed-size blocks. The calling thread
//! resolves each block's seed window strictly in index order and hands the
//! block to the worker pool as soon as its seed is known, so block `k` may
//! still be filling while block `k+1` is being seeded.
//!
//! A seed comes from the store when its four values are already present.
//! Otherwise it is derived from the previous block's seed with the cached
//! `M^block_size` transition, which does not wait for the previous block's
//! fill. Inside a block the worker only advances a local [`Window`]; it
//! writes to the store but never reads from it.
//!
//! Block outcomes travel back over a crossbeam channel. Every block's final
//! window must equal the next block's seed; a disagreement is reported as a
//! computation failure rather than returning a wrong value.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use num_bigint::BigUint;
use rayon::ThreadPool;
use tracing::debug;

use crate::compaction::{CompactionPolicy, Compactor};
use crate::constants::{BASE_LEN, DEFAULT_BLOCK_SIZE};
use crate::evaluator::{Evaluator, LabseqError};
use crate::observer::ProgressObserver;
use crate::progress::{CancellationToken, ProgressUpdate};
use crate::recurrence::Window;
use crate::seed::{read_window, resolve_window, resume_index};
use crate::selector::Strategy;
use crate::store::ValueStore;
use crate::transition::Transition;

/// A contiguous index range `start..=end` processed by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    ordinal: usize,
    start: u64,
    end: u64,
}

impl Block {
    fn len(self) -> u64 {
        self.end - self.start + 1
    }
}

/// Outcome of one filled block.
struct BlockReport {
    ordinal: usize,
    tail: Window,
}

/// Split `start..=n` into blocks of at most `block_size` indices.
fn plan_blocks(start: u64, n: u64, block_size: u64) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut block_start = start;
    while block_start <= n {
        let end = block_start.saturating_add(block_size - 1).min(n);
        blocks.push(Block {
            ordinal: blocks.len(),
            start: block_start,
            end,
        });
        block_start = end + 1;
    }
    blocks
}

/// Advance `seed` through `block`, writing every value to the store.
fn fill_block(
    store: &dyn ValueStore,
    block: Block,
    seed: Window,
    compactor: Option<&Compactor>,
) -> BlockReport {
    let mut window = seed;
    while window.next_index() <= block.end {
        let (i, value) = window.advance();
        store.put(i, value);
        if let Some(compactor) = compactor {
            compactor.maybe_compact(store, i);
        }
    }
    BlockReport {
        ordinal: block.ordinal,
        tail: window,
    }
}

/// Block pipeline over a shared worker pool.
pub struct SegmentedEvaluator {
    block_size: u64,
    compaction: Option<CompactionPolicy>,
    pool: Arc<ThreadPool>,
    jump: OnceLock<Transition>,
}

impl SegmentedEvaluator {
    /// Create an evaluator (`block_size == 0` selects the default).
    #[must_use]
    pub fn new(
        block_size: u64,
        compaction: Option<CompactionPolicy>,
        pool: Arc<ThreadPool>,
    ) -> Self {
        let block_size = if block_size == 0 {
            DEFAULT_BLOCK_SIZE
        } else {
            block_size
        };
        Self {
            block_size,
            compaction,
            pool,
            jump: OnceLock::new(),
        }
    }

    /// Number of indices per block.
    #[must_use]
    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    fn jump(&self) -> &Transition {
        self.jump.get_or_init(|| Transition::power(self.block_size))
    }

    /// Seed for `block`, given the seed of the block before it.
    fn seed_after(&self, store: &dyn ValueStore, block: Block, previous: &Window) -> Window {
        if let Some(window) = read_window(store, block.start) {
            return window;
        }
        self.jump().apply(previous)
    }

    /// Seed blocks in order and dispatch each one, stopping at cancellation.
    ///
    /// Returns the seeds of every dispatched block. Blocks already handed to
    /// the pool run to completion even when seeding stops early.
    #[allow(clippy::too_many_arguments)]
    fn run_pipeline(
        &self,
        store: &dyn ValueStore,
        blocks: &[Block],
        first_seed: Window,
        compactor: Option<&Compactor>,
        cancel: &CancellationToken,
        observer: &dyn ProgressObserver,
        total: u64,
    ) -> (Vec<Window>, Vec<BlockReport>, Result<(), LabseqError>) {
        let (tx, rx) = crossbeam_channel::unbounded::<BlockReport>();
        let completed = AtomicU64::new(0);
        let name = self.name();
        let mut seeds: Vec<Window> = Vec::with_capacity(blocks.len());

        let outcome = self.pool.in_place_scope(|scope| {
            for &block in blocks {
                cancel.checkpoint()?;

                let seed = match seeds.last() {
                    None => first_seed.clone(),
                    Some(previous) => self.seed_after(store, block, previous),
                };
                if seed.next_index() != block.start {
                    return Err(LabseqError::Computation(format!(
                        "seed for block at {} starts at {}",
                        block.start,
                        seed.next_index()
                    )));
                }
                if let Some(compactor) = compactor {
                    let next_seed_start = (block.end + 1).saturating_sub(BASE_LEN);
                    compactor.retain_from(next_seed_start);
                }
                seeds.push(seed.clone());

                let tx = tx.clone();
                let completed = &completed;
                scope.spawn(move |_| {
                    let report = fill_block(store, block, seed, compactor);
                    let done = completed.fetch_add(block.len(), Ordering::Relaxed) + block.len();
                    observer.on_progress(&ProgressUpdate::new(name, done, total));
                    // The receiver outlives the scope.
                    let _ = tx.send(report);
                });
            }
            Ok(())
        });
        drop(tx);

        let mut reports: Vec<BlockReport> = rx.iter().collect();
        reports.sort_by_key(|r| r.ordinal);
        (seeds, reports, outcome)
    }
}

impl Evaluator for SegmentedEvaluator {
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
        let blocks = plan_blocks(start, n, self.block_size);
        let total = n - start + 1;
        debug!(
            start,
            n,
            block_size = self.block_size,
            blocks = blocks.len(),
            compaction = self.compaction.is_some(),
            "segmented fill"
        );

        cancel.checkpoint()?;
        let first_seed = resolve_window(store, start)?;
        let compactor = self.compaction.map(Compactor::new);

        let (seeds, reports, outcome) = self.run_pipeline(
            store,
            &blocks,
            first_seed,
            compactor.as_ref(),
            cancel,
            observer,
            total,
        );
        outcome?;

        if reports.len() != blocks.len() {
            return Err(LabseqError::Computation(format!(
                "{} of {} blocks reported",
                reports.len(),
                blocks.len()
            )));
        }
        for (report, next_seed) in reports.iter().zip(seeds.iter().skip(1)) {
            if report.tail != *next_seed {
                return Err(LabseqError::Computation(format!(
                    "block {} does not end on the seed of the next block",
                    report.ordinal
                )));
            }
        }
        if let Some(compactor) = &compactor {
            debug!(runs = compactor.runs(), "segmented compaction summary");
        }

        observer.on_progress(&ProgressUpdate::done(self.name()));
        let last = reports
            .last()
            .ok_or_else(|| LabseqError::Computation(format!("index {n} was not produced")))?;
        Ok(Arc::clone(last.tail.last()))
    }

    fn strategy(&self) -> Strategy {
        Strategy::Segmented
    }
}
