//! Command-line runtime for the picker.
//!
//! The runtime loads configuration, installs telemetry, builds a session over
//! a fixture tree, and replays the steps given on the command line. A finished
//! session prints its result as JSON; otherwise the node left on screen is
//! listed. Configuration loading and IO streams can be substituted so tests
//! exercise the same path as the binary.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use picker_config::Config;
use picker_core::{Credential, RootLabels, SessionOutcome, SessionResult};
use picker_dispatch::FixtureTree;
use tracing::error;

mod cli;
mod config;
mod errors;
pub mod output;
mod replay;
pub mod telemetry;

#[cfg(test)]
mod tests;

use cli::Cli;
use config::{ConfigLoader, OrthoConfigLoader, prepare_cli_arguments, split_config_arguments};
use errors::AppError;
pub use output::{OutputFormat, ResolvedOutputFormat};
use replay::{Finale, Replay};

/// Exit status for a session the user cancelled.
const EXIT_CANCELLED: u8 = 1;
/// Exit status for failed sessions and usage errors.
const EXIT_FAILURE: u8 = 2;

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
    stdout_is_terminal: bool,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E, stdout_is_terminal: bool) -> Self {
        Self {
            stdout,
            stderr,
            stdout_is_terminal,
        }
    }
}

struct CliRunner<'a, 'io, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'io, W, E>,
    loader: &'a L,
}

impl<'a, 'io, W, E, L> CliRunner<'a, 'io, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    const fn new(io: &'a mut IoStreams<'io, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);
        let cli_arguments = prepare_cli_arguments(&args, &split);

        let result = Cli::try_parse_from(cli_arguments)
            .map_err(AppError::CliUsage)
            .and_then(|cli| {
                self.loader
                    .load(&split.config_arguments)
                    .map(|config| (cli, config))
            })
            .and_then(|(cli, config)| self.execute(cli, &config));

        match result {
            Ok(exit_code) => exit_code,
            Err(app_error) if app_error.is_informational() => {
                let _ = write!(self.io.stdout, "{app_error}");
                ExitCode::SUCCESS
            }
            Err(app_error) => {
                error!(
                    target: "picker_cli",
                    event = "run_failed",
                    error = %app_error,
                    "picker run failed"
                );
                let _ = writeln!(self.io.stderr, "{app_error}");
                ExitCode::from(EXIT_FAILURE)
            }
        }
    }

    fn execute(&mut self, cli: Cli, config: &Config) -> Result<ExitCode, AppError> {
        telemetry::initialise(config)?;
        let format = cli.output.resolve(self.io.stdout_is_terminal);
        let tree = FixtureTree::from_path(&cli.tree)?;
        let labels = RootLabels::new(config.root_title(), config.root_subtitle());
        let replay = Replay::start(
            tree,
            labels,
            Credential::new(cli.access_token),
            config.prefetch_window(),
        )?;

        match replay.run(&cli.steps)? {
            Finale::Finished(outcome) => {
                let result = SessionResult::from(&outcome);
                output::write_result(&mut *self.io.stdout, &result, format)?;
                Ok(exit_code_for(&outcome))
            }
            Finale::Browsing(listing) => {
                output::write_listing(&mut *self.io.stdout, &listing, format)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn exit_code_for(outcome: &SessionOutcome) -> ExitCode {
    match outcome {
        SessionOutcome::Selected(_) => ExitCode::SUCCESS,
        SessionOutcome::Cancelled => ExitCode::from(EXIT_CANCELLED),
        SessionOutcome::ApiError(_) | SessionOutcome::SystemError(_) => {
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Runs the CLI using the provided arguments and IO handles.
///
/// Exits with `0` after a selection or a listing, `1` when the session was
/// cancelled, and `2` for failed sessions and usage errors.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E, stdout_is_terminal: bool) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr, stdout_is_terminal);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader).run(args)
}
