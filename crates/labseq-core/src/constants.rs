//! Constants for the Labseq recurrence, strategy thresholds, and evaluator tuning.

/// Values at indices 0..=3; every other term follows from them.
pub const BASE_VALUES: [u64; 4] = [0, 1, 0, 1];

/// Number of pinned base entries (indices `0..BASE_LEN` are never evicted).
pub const BASE_LEN: u64 = 4;

/// Width of a seed window: `value(i)` needs `value(i-4)` and `value(i-3)`.
pub const SEED_WIDTH: usize = 4;

/// Largest accepted index (`i32::MAX`).
pub const MAX_INDEX: u64 = 2_147_483_647;

/// Default upper bound (inclusive) of the SMALL range, served sequentially.
pub const DEFAULT_ITERATIVE_THRESHOLD: u64 = 1_000;

/// Default upper bound (inclusive) of the MEDIUM range, served in chunks.
pub const DEFAULT_BATCHED_THRESHOLD: u64 = 100_000;

/// Default number of indices filled per chunk by the chunked evaluator.
pub const DEFAULT_CHUNK_SIZE: u64 = 64;

/// Default number of indices per block in the segmented evaluator.
pub const DEFAULT_BLOCK_SIZE: u64 = 100_000;

/// Default compaction interval (in indices) when compaction is enabled.
pub const DEFAULT_COMPACTION_INTERVAL: u64 = 1_024;

/// Tasks per wave in the naive parallel evaluator.
///
/// Indices `s`, `s+1` and `s+2` only depend on values below `s`; `s+3`
/// already depends on `s`.
pub const WAVE_WIDTH: u64 = 3;

/// Minimum progress change, in thousandths, before an observer forwards
/// another update (1%).
pub const PROGRESS_STEP_PERMILLE: u64 = 10;

/// Precomputed Labseq values for n = 0..=63, used by tests as an
/// independent reference.
pub const LABSEQ_TABLE: [u64; 64] = {
    let mut table = [0u64; 64];
    table[0] = BASE_VALUES[0];
    table[1] = BASE_VALUES[1];
    table[2] = BASE_VALUES[2];
    table[3] = BASE_VALUES[3];
    let mut i = 4;
    while i < 64 {
        table[i] = table[i - 4] + table[i - 3];
        i += 1;
    }
    table
};

/// Process exit codes.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error (invalid input, computation failure).
    pub const ERROR_GENERIC: i32 = 1;
    /// Computation timed out.
    pub const ERROR_TIMEOUT: i32 = 2;
    /// Strategy results did not match during cross-validation.
    pub const ERROR_MISMATCH: i32 = 3;
    /// Invalid configuration.
    pub const ERROR_CONFIG: i32 = 4;
    /// Computation cancelled by user (Ctrl+C).
    pub const ERROR_CANCELED: i32 = 130;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_first_values() {
        assert_eq!(&LABSEQ_TABLE[..11], &[0, 1, 0, 1, 1, 1, 1, 2, 2, 2, 3]);
    }

    #[test]
    fn table_consistency() {
        for i in 4..64 {
            assert_eq!(LABSEQ_TABLE[i], LABSEQ_TABLE[i - 4] + LABSEQ_TABLE[i - 3]);
        }
    }

    #[test]
    fn default_thresholds_are_ordered() {
        assert!(DEFAULT_ITERATIVE_THRESHOLD <= DEFAULT_BATCHED_THRESHOLD);
    }
}
