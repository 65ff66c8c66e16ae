//! Strategy identifiers and threshold-based strategy selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BATCHED_THRESHOLD, DEFAULT_ITERATIVE_THRESHOLD};
use crate::evaluator::LabseqError;

/// The closed set of evaluation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Strict in-order fill; the reference strategy.
    Sequential,
    /// Sequential fill in fixed-size chunks.
    Chunked,
    /// Wave-scheduled one-task-per-index fan-out. Explicit override only.
    NaiveParallel,
    /// Block pipeline with sequential seeding and parallel fills.
    Segmented,
}

impl Strategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Strategy; 4] = [
        Strategy::Sequential,
        Strategy::Chunked,
        Strategy::NaiveParallel,
        Strategy::Segmented,
    ];

    /// Display name used in logs, progress updates, and results.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Sequential => "Sequential",
            Strategy::Chunked => "Chunked",
            Strategy::NaiveParallel => "NaiveParallel",
            Strategy::Segmented => "Segmented",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = LabseqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" | "iterative" => Ok(Strategy::Sequential),
            "chunked" | "batched" => Ok(Strategy::Chunked),
            "naive-parallel" | "naiveparallel" | "parallel" => Ok(Strategy::NaiveParallel),
            "segmented" | "parallel-segmented" => Ok(Strategy::Segmented),
            other => Err(LabseqError::Config(format!("unknown strategy: {other}"))),
        }
    }
}

/// Input magnitude class of a requested index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    Small,
    Medium,
    Large,
}

/// Index boundaries partitioning requests into SMALL, MEDIUM and LARGE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    iterative: u64,
    batched: u64,
}

impl Thresholds {
    /// Validate raw (possibly negative) configuration values.
    pub fn new(iterative: i64, batched: i64) -> Result<Self, LabseqError> {
        let iterative = u64::try_from(iterative).map_err(|_| {
            LabseqError::Config(format!(
                "iterative threshold must be non-negative, got {iterative}"
            ))
        })?;
        let batched = u64::try_from(batched).map_err(|_| {
            LabseqError::Config(format!(
                "batched threshold must be non-negative, got {batched}"
            ))
        })?;
        let thresholds = Self { iterative, batched };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Upper bound (inclusive) of the SMALL range.
    #[must_use]
    pub fn iterative(&self) -> u64 {
        self.iterative
    }

    /// Upper bound (inclusive) of the MEDIUM range.
    #[must_use]
    pub fn batched(&self) -> u64 {
        self.batched
    }

    /// Check `iterative <= batched`.
    pub fn validate(&self) -> Result<(), LabseqError> {
        if self.iterative > self.batched {
            return Err(LabseqError::Config(format!(
                "iterative threshold ({}) must not exceed batched threshold ({})",
                self.iterative, self.batched
            )));
        }
        Ok(())
    }

    /// Classify an index.
    #[must_use]
    pub fn range_of(&self, n: u64) -> Range {
        if n <= self.iterative {
            Range::Small
        } else if n <= self.batched {
            Range::Medium
        } else {
            Range::Large
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            iterative: DEFAULT_ITERATIVE_THRESHOLD,
            batched: DEFAULT_BATCHED_THRESHOLD,
        }
    }
}

/// Chooses a strategy from the magnitude of the requested index.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategySelector {
    thresholds: Thresholds,
}

impl StrategySelector {
    #[must_use]
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Strategy for index `n`. Never returns [`Strategy::NaiveParallel`].
    #[must_use]
    pub fn select(&self, n: u64) -> Strategy {
        match self.thresholds.range_of(n) {
            Range::Small => Strategy::Sequential,
            Range::Medium => Strategy::Chunked,
            Range::Large => Strategy::Segmented,
        }
    }
}
