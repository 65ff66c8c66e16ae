//! Seams between orchestration and whatever displays its results.

use std::time::Duration;

use labseq_core::engine::EvaluationResult;
use labseq_core::evaluator::LabseqError;
use labseq_core::progress::ProgressUpdate;

/// Displays progress of running evaluations.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: &ProgressUpdate);

    /// Called once after every evaluation has returned.
    fn complete(&self);
}

/// Displays outcomes of evaluations.
pub trait ResultPresenter: Send + Sync {
    /// One successful evaluation; `details` adds size information.
    fn present_result(&self, result: &EvaluationResult, duration: Duration, details: bool);

    /// Side-by-side view of several strategy runs for the same index.
    fn present_comparison(&self, results: &[CalculationResult]);

    fn present_error(&self, error: &str);
}

/// Outcome of running one strategy selection.
#[derive(Debug, Clone)]
pub struct CalculationResult {
    /// Strategy that ran, `"Auto"` if threshold selection failed before picking one.
    pub strategy: String,
    pub outcome: Result<EvaluationResult, LabseqError>,
    pub duration: Duration,
}

impl CalculationResult {
    /// The evaluation, if the run succeeded.
    #[must_use]
    pub fn evaluation(&self) -> Option<&EvaluationResult> {
        self.outcome.as_ref().ok()
    }

    /// The error, if the run failed.
    #[must_use]
    pub fn error(&self) -> Option<&LabseqError> {
        self.outcome.as_ref().err()
    }
}
