//! CLI entrypoint for the picker.
//!
//! The binary delegates to [`picker_cli::run`], which loads configuration,
//! replays the requested navigation steps against a fixture tree, and prints
//! either the session result or the listing left on screen.

use std::io::{self, IsTerminal, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let stdout_is_terminal = io::stdout().is_terminal();
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    picker_cli::run(
        std::env::args_os(),
        &mut stdout,
        &mut stderr,
        stdout_is_terminal,
    )
}
