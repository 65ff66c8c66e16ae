//! Application entry point and dispatch.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use labseq_cli::output::write_to_file;
use labseq_cli::presenter::{CLIProgressReporter, CLIResultPresenter};
use labseq_core::constants::exit_codes;
use labseq_core::evaluator::LabseqError;
use labseq_core::observer::{ChannelObserver, LoggingObserver};
use labseq_core::options::EngineOptions;
use labseq_core::progress::CancellationToken;
use labseq_core::selector::Strategy;
use labseq_orchestration::interfaces::{CalculationResult, ProgressReporter, ResultPresenter};
use labseq_orchestration::orchestrator::{
    analyze_comparison_results, execute_calculations_with_observer,
};
use labseq_orchestration::strategy_selection::get_strategies_to_run;

use crate::config::AppConfig;
use crate::errors::handle_error;

const PROGRESS_CHANNEL_CAPACITY: usize = 256;
const LOG_INTERVAL_MS: u64 = 500;

/// Run the application and return the process exit code.
///
/// Evaluation failures are presented and mapped to an exit code here.
/// Setup failures (bad flags, unwritable output) come back as `Err`, except
/// in JSON mode where they are presented as a `{"message": ..}` body.
pub fn run(config: &AppConfig) -> Result<i32> {
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        labseq_cli::completion::write_completion(&mut cmd, shell, &mut std::io::stdout());
        return Ok(exit_codes::SUCCESS);
    }
    run_cli(config)
}

fn run_cli(config: &AppConfig) -> Result<i32> {
    let presenter = CLIResultPresenter::new(config.verbose, config.quiet, config.json);
    let results = match evaluate(config) {
        Ok(results) => results,
        Err(e) if config.json => {
            presenter.present_error(&e.to_string());
            return Ok(handle_error(&e));
        }
        Err(e) => return Err(e.into()),
    };

    if let [single] = results.as_slice() {
        return present_single(config, &presenter, single);
    }
    present_many(config, &presenter, &results)
}

fn evaluate(config: &AppConfig) -> Result<Vec<CalculationResult>, LabseqError> {
    let n = config
        .n
        .ok_or_else(|| LabseqError::Config("missing index (-n)".into()))?;
    let opts = config.engine_options()?;
    let timeout = config.timeout_duration()?;
    let selections = get_strategies_to_run(&config.strategy)?;
    debug!(n, strategies = selections.len(), ?timeout, "starting evaluation");

    let cancel = CancellationToken::new();
    ctrlc_handler(cancel.clone());

    if config.progress && !config.quiet && !config.json {
        execute_with_progress(&selections, n, &opts, &cancel, timeout)
    } else {
        let observer = LoggingObserver::new(LOG_INTERVAL_MS);
        execute_calculations_with_observer(
            &selections,
            n,
            &opts,
            &cancel,
            Some(timeout),
            &observer,
        )
    }
}

fn present_single(
    config: &AppConfig,
    presenter: &CLIResultPresenter,
    result: &CalculationResult,
) -> Result<i32> {
    match &result.outcome {
        Ok(evaluation) => {
            presenter.present_result(evaluation, result.duration, config.details);
            if let Some(path) = &config.output {
                write_to_file(path, &evaluation.value)
                    .with_context(|| format!("writing result to {}", path.display()))?;
            }
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => {
            presenter.present_error(&e.to_string());
            Ok(handle_error(e))
        }
    }
}

fn present_many(
    config: &AppConfig,
    presenter: &CLIResultPresenter,
    results: &[CalculationResult],
) -> Result<i32> {
    if let Some((evaluation, duration)) = results
        .iter()
        .find_map(|r| r.evaluation().map(|e| (e, r.duration)))
    {
        presenter.present_result(evaluation, duration, config.details);
        if let Some(path) = &config.output {
            write_to_file(path, &evaluation.value)
                .with_context(|| format!("writing result to {}", path.display()))?;
        }
    }
    presenter.present_comparison(results);

    match analyze_comparison_results(results) {
        Ok(()) => {
            if !config.quiet && !config.json {
                labseq_cli::ui::print_success("all strategies agree");
            }
            Ok(exit_codes::SUCCESS)
        }
        Err(LabseqError::Mismatch) => {
            presenter.present_error(&LabseqError::Mismatch.to_string());
            Ok(exit_codes::ERROR_MISMATCH)
        }
        Err(e) => {
            // Every strategy failed: report the first failure.
            let first = results.iter().find_map(CalculationResult::error);
            let err = first.unwrap_or(&e);
            presenter.present_error(&err.to_string());
            Ok(handle_error(err))
        }
    }
}

/// Run the selections while a progress bar drains observer updates.
fn execute_with_progress(
    selections: &[Option<Strategy>],
    n: i64,
    opts: &EngineOptions,
    cancel: &CancellationToken,
    timeout: std::time::Duration,
) -> Result<Vec<CalculationResult>, LabseqError> {
    let (tx, rx) = crossbeam_channel::bounded(PROGRESS_CHANNEL_CAPACITY);
    let reporter = CLIProgressReporter::new(selections.len());

    let results = std::thread::scope(|s| {
        let drain = s.spawn(|| {
            for update in &rx {
                reporter.report(&update);
            }
        });
        let observer = ChannelObserver::new(tx);
        let results = execute_calculations_with_observer(
            selections,
            n,
            opts,
            cancel,
            Some(timeout),
            &observer,
        );
        // Closing the last sender ends the drain loop.
        drop(observer);
        if drain.join().is_err() {
            warn!("progress reporter thread panicked");
        }
        results
    });
    reporter.complete();
    results
}

fn ctrlc_handler(cancel: CancellationToken) {
    if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
        warn!(error = %e, "could not install Ctrl+C handler");
    }
}
