//! Error handling and exit codes.

use labseq_core::constants::exit_codes;
use labseq_core::evaluator::LabseqError;

/// Exit code for an evaluation error.
pub fn handle_error(err: &LabseqError) -> i32 {
    match err {
        LabseqError::InvalidInput(_) | LabseqError::Computation(_) => exit_codes::ERROR_GENERIC,
        LabseqError::Config(_) => exit_codes::ERROR_CONFIG,
        LabseqError::Cancelled => exit_codes::ERROR_CANCELED,
        LabseqError::Timeout(_) => exit_codes::ERROR_TIMEOUT,
        LabseqError::Mismatch => exit_codes::ERROR_MISMATCH,
    }
}

/// Exit code for an application error, looking for a `LabseqError` in the chain.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<LabseqError>())
        .map_or(exit_codes::ERROR_GENERIC, handle_error)
}
