//! Application configuration from CLI flags and environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use labseq_core::compaction::CompactionPolicy;
use labseq_core::constants::DEFAULT_COMPACTION_INTERVAL;
use labseq_core::evaluator::LabseqError;
use labseq_core::options::EngineOptions;
use labseq_core::selector::Thresholds;

/// labseq: compute terms of l(n) = l(n-4) + l(n-3) with l(0..3) = 0, 1, 0, 1.
#[derive(Parser, Debug)]
#[command(name = "labseq", version, about)]
#[allow(clippy::struct_excessive_bools)]
pub struct AppConfig {
    /// Index of the term to compute.
    #[arg(
        short,
        long,
        allow_negative_numbers = true,
        env = "LABSEQ_N",
        required_unless_present = "completion"
    )]
    pub n: Option<i64>,

    /// Strategy: auto, sequential, chunked, parallel, segmented, or all.
    #[arg(long, default_value = "auto")]
    pub strategy: String,

    /// Largest index served by the sequential strategy.
    #[arg(
        long,
        default_value = "1000",
        env = "LABSEQ_THRESHOLD_ITERATIVE",
        allow_negative_numbers = true
    )]
    pub iterative_threshold: i64,

    /// Largest index served by the chunked strategy.
    #[arg(
        long,
        default_value = "100000",
        env = "LABSEQ_THRESHOLD_BATCHED",
        allow_negative_numbers = true
    )]
    pub batched_threshold: i64,

    /// Indices per chunk (0 = default).
    #[arg(long, default_value = "0")]
    pub chunk_size: u64,

    /// Indices per segmented block (0 = default).
    #[arg(long, default_value = "0")]
    pub block_size: u64,

    /// Worker threads (0 = available parallelism).
    #[arg(long, default_value = "0")]
    pub workers: usize,

    /// Enable store compaction during segmented fills, keeping this many
    /// entries behind the current index.
    #[arg(long)]
    pub compaction_window: Option<u64>,

    /// Indices between two compaction passes.
    #[arg(long, default_value_t = DEFAULT_COMPACTION_INTERVAL)]
    pub compaction_interval: u64,

    /// Timeout duration (e.g., "30s", "5m", "1h").
    #[arg(long, default_value = "5m")]
    pub timeout: String,

    /// Print `{"n", "result"}` on success and `{"message"}` on failure.
    #[arg(long)]
    pub json: bool,

    /// Output file path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Quiet mode (only output the number).
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose output (full value, no truncation).
    #[arg(short, long)]
    pub verbose: bool,

    /// Show detailed information.
    #[arg(short, long)]
    pub details: bool,

    /// Show a progress bar.
    #[arg(long)]
    pub progress: bool,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Build and validate engine options from the flags.
    pub fn engine_options(&self) -> Result<EngineOptions, LabseqError> {
        let compaction = self.compaction_window.map(|window| {
            CompactionPolicy::new(window).with_interval(self.compaction_interval)
        });
        let opts = EngineOptions {
            thresholds: Thresholds::new(self.iterative_threshold, self.batched_threshold)?,
            chunk_size: self.chunk_size,
            block_size: self.block_size,
            workers: self.workers,
            compaction,
        }
        .normalize();
        opts.validate()?;
        Ok(opts)
    }

    /// Parse the timeout flag.
    pub fn timeout_duration(&self) -> Result<Duration, LabseqError> {
        parse_duration(&self.timeout)
            .ok_or_else(|| LabseqError::Config(format!("invalid timeout: {}", self.timeout)))
    }
}

/// Parse a duration string like "5m", "1h", "30s", "250ms".
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        let n: u64 = ms.parse().ok()?;
        Some(Duration::from_millis(n))
    } else if let Some(mins) = s.strip_suffix('m') {
        let n: u64 = mins.parse().ok()?;
        Some(Duration::from_secs(n.checked_mul(60)?))
    } else if let Some(hours) = s.strip_suffix('h') {
        let n: u64 = hours.parse().ok()?;
        Some(Duration::from_secs(n.checked_mul(3600)?))
    } else if let Some(secs) = s.strip_suffix('s') {
        let n: u64 = secs.parse().ok()?;
        Some(Duration::from_secs(n))
    } else {
        let n: u64 = s.parse().ok()?;
        Some(Duration::from_secs(n))
    }
}
