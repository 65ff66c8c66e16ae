//! Strategy selection from a user-facing name.

use labseq_core::evaluator::LabseqError;
use labseq_core::selector::Strategy;

/// Strategies to run for a selection name.
///
/// `"auto"` yields a single `None` (threshold-based selection), `"all"`
/// yields every strategy, anything else must parse as a [`Strategy`].
pub fn get_strategies_to_run(selection: &str) -> Result<Vec<Option<Strategy>>, LabseqError> {
    match selection.to_lowercase().as_str() {
        "auto" => Ok(vec![None]),
        "all" => Ok(Strategy::ALL.into_iter().map(Some).collect()),
        name => Ok(vec![Some(name.parse()?)]),
    }
}
