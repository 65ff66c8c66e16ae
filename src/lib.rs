//! Workspace-level integration tests for Labseq-rs live under `tests/`.
