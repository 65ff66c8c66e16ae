//! CLI result presenter and progress bar.

use std::collections::HashMap;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use parking_lot::Mutex;

use labseq_core::engine::EvaluationResult;
use labseq_core::progress::ProgressUpdate;
use labseq_orchestration::interfaces::{CalculationResult, ProgressReporter, ResultPresenter};

use crate::output::{
    format_duration, format_json_error, format_json_result, format_number, format_result,
};
use crate::ui;

/// CLI result presenter.
///
/// The `render_*` methods build the text; the [`ResultPresenter`] methods
/// print it.
pub struct CLIResultPresenter {
    verbose: bool,
    quiet: bool,
    json: bool,
}

impl CLIResultPresenter {
    #[must_use]
    pub fn new(verbose: bool, quiet: bool, json: bool) -> Self {
        Self {
            verbose,
            quiet,
            json,
        }
    }

    /// Output for one successful evaluation.
    #[must_use]
    pub fn render_result(
        &self,
        result: &EvaluationResult,
        duration: Duration,
        details: bool,
    ) -> String {
        if self.json {
            return format_json_result(result)
                .unwrap_or_else(|e| format_json_error(&e.to_string()));
        }
        if self.quiet {
            return result.value.to_string();
        }

        let index = format_number(result.index);
        let mut lines = vec![
            format!("Strategy: {}", result.strategy),
            format!("N: {index}"),
            format!("Duration: {}", format_duration(duration)),
        ];
        if details {
            lines.push(format!("Result bits: {}", result.value.bits()));
            lines.push(format!("Result digits: {}", result.value.to_string().len()));
        }
        lines.push(format!(
            "L({index}) = {}",
            format_result(&result.value, self.verbose)
        ));
        lines.join("\n")
    }

    /// Comparison table, or `None` in quiet and JSON modes.
    #[must_use]
    pub fn render_comparison(&self, results: &[CalculationResult]) -> Option<String> {
        if self.quiet || self.json {
            return None;
        }

        let mut lines = vec![ui::header_line("Comparison Results")];
        for result in results {
            let status = match &result.outcome {
                Ok(_) => "OK".to_string(),
                Err(e) => format!("ERROR: {e}"),
            };
            lines.push(format!(
                "  {:<16} {:>12} [{}]",
                result.strategy,
                format_duration(result.duration),
                status,
            ));
        }
        Some(lines.join("\n"))
    }

    /// `{"message": ..}` in JSON mode, a styled error line otherwise.
    #[must_use]
    pub fn render_error(&self, error: &str) -> String {
        if self.json {
            format_json_error(error)
        } else {
            ui::error_line(error)
        }
    }
}

impl ResultPresenter for CLIResultPresenter {
    fn present_result(&self, result: &EvaluationResult, duration: Duration, details: bool) {
        println!("{}", self.render_result(result, duration, details));
    }

    fn present_comparison(&self, results: &[CalculationResult]) {
        if let Some(table) = self.render_comparison(results) {
            println!("{table}");
        }
    }

    fn present_error(&self, error: &str) {
        let body = self.render_error(error);
        if self.json {
            println!("{body}");
        } else {
            eprintln!("{body}");
        }
    }
}

const PROGRESS_TEMPLATE: &str = "[{elapsed_precise}] {bar:40.cyan/blue} {percent:>3}% {msg}";
const PROGRESS_SCALE: u64 = 1_000;

/// Terminal progress bar fed with evaluator progress updates.
///
/// With several strategies running at once the bar follows the slowest
/// one; a strategy that has not reported yet counts as zero.
pub struct CLIProgressReporter {
    bar: ProgressBar,
    expected: usize,
    fractions: Mutex<HashMap<&'static str, f64>>,
}

impl CLIProgressReporter {
    /// Progress bar drawn on stderr for `expected` concurrent strategies.
    #[must_use]
    pub fn new(expected: usize) -> Self {
        Self::with_target(ProgressDrawTarget::stderr(), expected)
    }

    /// Progress bar that never draws (for tests and non-interactive runs).
    #[must_use]
    pub fn hidden(expected: usize) -> Self {
        Self::with_target(ProgressDrawTarget::hidden(), expected)
    }

    fn with_target(target: ProgressDrawTarget, expected: usize) -> Self {
        let bar = ProgressBar::with_draw_target(Some(PROGRESS_SCALE), target);
        let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        bar.set_style(style);
        Self {
            bar,
            expected: expected.max(1),
            fractions: Mutex::new(HashMap::new()),
        }
    }

    /// Current bar position in thousandths.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Whether the bar has been finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}

impl ProgressReporter for CLIProgressReporter {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn report(&self, update: &ProgressUpdate) {
        let mut fractions = self.fractions.lock();
        let entry = fractions.entry(update.strategy).or_insert(0.0);
        // Blocks of one fill may report out of order.
        *entry = entry.max(update.fraction());

        let (slowest, fraction) = if fractions.len() < self.expected {
            (update.strategy, 0.0)
        } else {
            fractions
                .iter()
                .map(|(name, f)| (*name, *f))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .unwrap_or((update.strategy, 0.0))
        };
        drop(fractions);

        self.bar.set_message(slowest);
        let position = (fraction * PROGRESS_SCALE as f64).round() as u64;
        if position > self.bar.position() {
            self.bar.set_position(position.min(PROGRESS_SCALE));
        }
    }

    fn complete(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labseq_core::evaluator::LabseqError;
    use labseq_core::selector::Strategy;
    use num_bigint::BigUint;

    fn evaluation(index: u64, value: u64) -> EvaluationResult {
        EvaluationResult {
            index,
            value: BigUint::from(value),
            strategy: Strategy::Chunked,
        }
    }

    fn plain(text: &str) -> String {
        console::strip_ansi_codes(text).into_owned()
    }

    #[test]
    fn render_result_plain() {
        let presenter = CLIResultPresenter::new(false, false, false);
        let text = presenter.render_result(&evaluation(50, 8505), Duration::from_millis(5), false);
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            ["Strategy: Chunked", "N: 50", "Duration: 5.00ms", "L(50) = 8505"]
        );
    }

    #[test]
    fn render_result_with_details() {
        let presenter = CLIResultPresenter::new(true, false, false);
        let text =
            presenter.render_result(&evaluation(1_234, 8505), Duration::from_millis(5), true);
        assert!(text.contains("N: 1,234"));
        assert!(text.contains("Result bits: 14"));
        assert!(text.contains("Result digits: 4"));
        assert!(text.ends_with("L(1,234) = 8505"));
    }

    #[test]
    fn render_result_quiet_is_the_bare_value() {
        let presenter = CLIResultPresenter::new(false, true, false);
        let text = presenter.render_result(&evaluation(50, 8505), Duration::from_millis(5), true);
        assert_eq!(text, "8505");
    }

    #[test]
    fn render_result_json() {
        let presenter = CLIResultPresenter::new(false, false, true);
        let text = presenter.render_result(&evaluation(50, 8505), Duration::from_millis(5), true);
        let body: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["n"], 50);
        assert_eq!(body["result"], "8505");
        assert_eq!(body["strategy"], "chunked");
    }

    #[test]
    fn render_comparison_lists_failures() {
        let presenter = CLIResultPresenter::new(false, false, false);
        let results = vec![
            CalculationResult {
                strategy: "Sequential".into(),
                outcome: Ok(evaluation(10, 3)),
                duration: Duration::from_millis(5),
            },
            CalculationResult {
                strategy: "Segmented".into(),
                outcome: Err(LabseqError::Computation("worker failed".into())),
                duration: Duration::from_millis(1),
            },
        ];
        let table = plain(&presenter.render_comparison(&results).unwrap());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "=== Comparison Results ===");
        assert!(lines[1].contains("Sequential") && lines[1].ends_with("[OK]"));
        assert!(lines[2].contains("Segmented"));
        assert!(lines[2].contains("[ERROR: computation failure: worker failed]"));
    }

    #[test]
    fn render_comparison_silent_in_quiet_and_json() {
        assert!(CLIResultPresenter::new(false, true, false)
            .render_comparison(&[])
            .is_none());
        assert!(CLIResultPresenter::new(false, false, true)
            .render_comparison(&[])
            .is_none());
    }

    #[test]
    fn render_error_plain_and_json() {
        let plain_line = CLIResultPresenter::new(false, false, false).render_error("bad input");
        assert_eq!(plain(&plain_line), "[ERROR] bad input");

        let json = CLIResultPresenter::new(false, false, true).render_error("bad input");
        let body: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(body["message"], "bad input");
    }

    #[test]
    fn progress_reporter_tracks_position() {
        let reporter = CLIProgressReporter::hidden(1);
        reporter.report(&ProgressUpdate::new("Segmented", 1, 4));
        assert_eq!(reporter.position(), 250);
        // Out-of-order block report.
        reporter.report(&ProgressUpdate::new("Segmented", 1, 10));
        assert_eq!(reporter.position(), 250);
        reporter.report(&ProgressUpdate::done("Segmented"));
        assert_eq!(reporter.position(), PROGRESS_SCALE);
        reporter.complete();
        assert!(reporter.is_finished());
    }

    #[test]
    fn progress_reporter_follows_slowest_strategy() {
        let reporter = CLIProgressReporter::hidden(4);
        reporter.report(&ProgressUpdate::done("Sequential"));
        assert_eq!(reporter.position(), 0);
        reporter.report(&ProgressUpdate::new("Chunked", 9, 10));
        reporter.report(&ProgressUpdate::new("NaiveParallel", 1, 10));
        assert_eq!(reporter.position(), 0);

        reporter.report(&ProgressUpdate::new("Segmented", 5, 10));
        assert_eq!(reporter.position(), 100);
        reporter.report(&ProgressUpdate::new("NaiveParallel", 7, 10));
        assert_eq!(reporter.position(), 500);
        reporter.report(&ProgressUpdate::done("Chunked"));
        reporter.report(&ProgressUpdate::done("NaiveParallel"));
        assert_eq!(reporter.position(), 500);
        assert!(!reporter.is_finished());

        reporter.report(&ProgressUpdate::done("Segmented"));
        assert_eq!(reporter.position(), PROGRESS_SCALE);
        reporter.complete();
        assert!(reporter.is_finished());
    }
}
