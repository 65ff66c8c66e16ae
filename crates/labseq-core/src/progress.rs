//! Progress updates and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::evaluator::LabseqError;

/// How far an evaluator has come in one fill.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Strategy producing the update.
    pub strategy: &'static str,
    /// Indices produced so far in this fill.
    pub completed: u64,
    /// Indices this fill has to produce.
    pub total: u64,
    /// Set on the last update of a fill.
    pub done: bool,
}

impl ProgressUpdate {
    #[must_use]
    pub fn new(strategy: &'static str, completed: u64, total: u64) -> Self {
        Self {
            strategy,
            completed: completed.min(total),
            total,
            done: false,
        }
    }

    /// Final update of a fill.
    #[must_use]
    pub fn done(strategy: &'static str) -> Self {
        Self {
            strategy,
            completed: 0,
            total: 0,
            done: true,
        }
    }

    /// Completed share in `[0.0, 1.0]`. An empty or finished fill counts as 1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.done || self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    budget: Duration,
}

/// Cancellation flag shared by clones, with an optional deadline.
///
/// Evaluators poll it between units of work (chunks, waves, blocks); work
/// already handed to the pool is never interrupted.
///
/// ```
/// use labseq_core::progress::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(token.checkpoint().is_ok());
///
/// token.clone().cancel();
/// assert!(token.is_cancelled());
/// assert!(token.checkpoint().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Deadline>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Token sharing this token's flag that also expires `budget` from now.
    #[must_use]
    pub fn with_deadline(&self, budget: Duration) -> Self {
        Self {
            flag: Arc::clone(&self.flag),
            deadline: Some(Deadline {
                at: Instant::now() + budget,
                budget,
            }),
        }
    }

    /// Request cancellation for every clone.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested or the deadline has passed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.checkpoint().is_err()
    }

    /// `Err(Cancelled)` after [`cancel`](Self::cancel), `Err(Timeout)` once
    /// the deadline has passed. An explicit cancel takes precedence.
    pub fn checkpoint(&self) -> Result<(), LabseqError> {
        if self.flag.load(Ordering::Relaxed) {
            return Err(LabseqError::Cancelled);
        }
        match self.deadline {
            Some(Deadline { at, budget }) if Instant::now() >= at => {
                Err(LabseqError::Timeout(format!("{budget:?}")))
            }
            _ => Ok(()),
        }
    }
}
