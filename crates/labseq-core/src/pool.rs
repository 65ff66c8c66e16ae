//! Worker pool shared by the parallel evaluators of one engine.

use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::evaluator::LabseqError;

/// Number of workers used when none is configured.
#[must_use]
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZero::get)
        .unwrap_or(4)
}

/// Build a named worker pool; `workers == 0` sizes it to available parallelism.
pub fn build_worker_pool(workers: usize) -> Result<Arc<ThreadPool>, LabseqError> {
    let workers = if workers == 0 {
        default_parallelism()
    } else {
        workers
    };
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("labseq-worker-{i}"))
        .build()
        .map_err(|e| LabseqError::Computation(format!("failed to create worker pool: {e}")))?;
    debug!(workers, "worker pool ready");
    Ok(Arc::new(pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parallelism_positive() {
        assert!(default_parallelism() > 0);
    }

    #[test]
    fn explicit_size() {
        let pool = build_worker_pool(3).unwrap();
        assert_eq!(pool.current_num_threads(), 3);
    }

    #[test]
    fn zero_uses_available_parallelism() {
        let pool = build_worker_pool(0).unwrap();
        assert_eq!(pool.current_num_threads(), default_parallelism());
    }

    #[test]
    fn threads_are_named() {
        let pool = build_worker_pool(1).unwrap();
        let name = pool.install(|| std::thread::current().name().map(str::to_owned));
        assert_eq!(name.as_deref(), Some("labseq-worker-0"));
    }
}
