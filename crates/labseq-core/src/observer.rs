//! Progress observers.
//!
//! Evaluators report through `&dyn ProgressObserver`. One observer may serve
//! several concurrent fills, and blocks of one segmented fill report from
//! several workers at once, so throttling is tracked per strategy and only
//! ever moves forward.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::constants::PROGRESS_STEP_PERMILLE;
use crate::progress::ProgressUpdate;

/// Receives progress updates from evaluators.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, update: &ProgressUpdate);
}

/// Lets an update through once its strategy's progress grew by one step.
#[derive(Default)]
struct Throttle {
    permille: Mutex<HashMap<&'static str, u64>>,
}

impl Throttle {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn permille(update: &ProgressUpdate) -> u64 {
        (update.fraction() * 1000.0).round() as u64
    }

    /// Claim `update` for reporting; `false` if it is too close to the last
    /// one of the same strategy. A `done` update is always admitted and
    /// resets that strategy.
    fn admit(&self, update: &ProgressUpdate) -> bool {
        let mut seen = self.permille.lock();
        if update.done {
            seen.remove(update.strategy);
            return true;
        }
        let next = Self::permille(update);
        let last = seen.entry(update.strategy).or_insert(0);
        if next >= *last + PROGRESS_STEP_PERMILLE {
            *last = next;
            true
        } else {
            false
        }
    }

    #[cfg(test)]
    fn last(&self, strategy: &str) -> u64 {
        self.permille.lock().get(strategy).copied().unwrap_or(0)
    }
}

/// Forwards updates over a crossbeam channel without blocking the fill.
pub struct ChannelObserver {
    sender: Sender<ProgressUpdate>,
    throttle: Throttle,
}

impl ChannelObserver {
    #[must_use]
    pub fn new(sender: Sender<ProgressUpdate>) -> Self {
        Self {
            sender,
            throttle: Throttle::default(),
        }
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_progress(&self, update: &ProgressUpdate) {
        if self.throttle.admit(update) {
            // Full or closed channel: drop the update.
            let _ = self.sender.try_send(update.clone());
        }
    }
}

/// Emits progress as `tracing` events, at most once per `min_interval_ms`.
pub struct LoggingObserver {
    started: Instant,
    min_interval_ms: u64,
    last_logged_ms: AtomicU64,
    throttle: Throttle,
}

impl LoggingObserver {
    #[must_use]
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            started: Instant::now(),
            min_interval_ms,
            last_logged_ms: AtomicU64::new(0),
            throttle: Throttle::default(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

impl ProgressObserver for LoggingObserver {
    fn on_progress(&self, update: &ProgressUpdate) {
        if update.done {
            self.throttle.admit(update);
            info!(strategy = update.strategy, "fill complete");
            return;
        }
        let now = self.elapsed_ms();
        let last = self.last_logged_ms.load(Ordering::Relaxed);
        if last != 0 && now.saturating_sub(last) < self.min_interval_ms {
            return;
        }
        if !self.throttle.admit(update) {
            return;
        }
        self.last_logged_ms.store(now.max(1), Ordering::Relaxed);
        debug!(
            strategy = update.strategy,
            completed = update.completed,
            total = update.total,
            percent = format!("{:.1}", update.fraction() * 100.0),
            "fill progress"
        );
    }
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpObserver;

impl NoOpObserver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProgressObserver for NoOpObserver {
    fn on_progress(&self, _update: &ProgressUpdate) {}
}
