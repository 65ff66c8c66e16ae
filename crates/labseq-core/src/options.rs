//! Engine options and configuration.

use crate::compaction::CompactionPolicy;
use crate::constants::{DEFAULT_BLOCK_SIZE, DEFAULT_CHUNK_SIZE};
use crate::evaluator::LabseqError;
use crate::selector::Thresholds;

/// Options for a Labseq engine.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Strategy selection boundaries.
    pub thresholds: Thresholds,
    /// Indices per chunk for the chunked evaluator (0 = default).
    pub chunk_size: u64,
    /// Indices per block for the segmented evaluator (0 = default).
    pub block_size: u64,
    /// Worker pool size (0 = available parallelism).
    pub workers: usize,
    /// Store compaction during segmented fills (disabled when `None`).
    pub compaction: Option<CompactionPolicy>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            workers: 0,
            compaction: None,
        }
    }
}

impl EngineOptions {
    /// Normalize options, applying defaults where values are zero.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.chunk_size == 0 {
            self.chunk_size = DEFAULT_CHUNK_SIZE;
        }
        if self.block_size == 0 {
            self.block_size = DEFAULT_BLOCK_SIZE;
        }
        self
    }

    /// Reject inconsistent settings.
    pub fn validate(&self) -> Result<(), LabseqError> {
        self.thresholds.validate()?;
        if let Some(policy) = &self.compaction {
            policy.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let opts = EngineOptions::default();
        assert_eq!(opts.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(opts.block_size, DEFAULT_BLOCK_SIZE);
        assert_eq!(opts.workers, 0);
        assert!(opts.compaction.is_none());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn normalize_zero_sizes() {
        let opts = EngineOptions {
            chunk_size: 0,
            block_size: 0,
            ..Default::default()
        }
        .normalize();
        assert_eq!(opts.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(opts.block_size, DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn validate_rejects_bad_compaction() {
        let opts = EngineOptions {
            compaction: Some(CompactionPolicy::new(2)),
            ..Default::default()
        };
        assert!(matches!(opts.validate(), Err(LabseqError::Config(_))));
    }
}
