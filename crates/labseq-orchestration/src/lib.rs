//! # labseq-orchestration
//!
//! Strategy selection, parallel execution, and cross-strategy result analysis.

pub mod interfaces;
pub mod orchestrator;
pub mod strategy_selection;

pub use interfaces::{CalculationResult, ProgressReporter, ResultPresenter};
pub use orchestrator::{
    analyze_comparison_results, execute_calculations, execute_calculations_with_observer,
};
pub use strategy_selection::get_strategies_to_run;
