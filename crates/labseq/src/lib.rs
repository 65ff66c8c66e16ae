//! Labseq calculator library: application logic behind the `labseq` binary.

pub mod app;
pub mod config;
pub mod errors;
