//! Shell completion scripts.

use std::io;

use clap::Command;
use clap_complete::Shell;

/// Executable name the scripts complete for.
pub const BIN_NAME: &str = "labseq";

/// Write the completion script of `cmd` for `shell` to `out`.
pub fn write_completion(cmd: &mut Command, shell: Shell, out: &mut dyn io::Write) {
    clap_complete::generate(shell, cmd, BIN_NAME, out);
}
