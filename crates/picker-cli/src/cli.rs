//! CLI argument definitions for the picker.

use camino::Utf8PathBuf;
use clap::Parser;

use crate::output::OutputFormat;

/// Command-line interface for replaying a browse session.
#[derive(Parser, Debug)]
#[command(name = "picker")]
pub(crate) struct Cli {
    /// JSON document describing the remote tree.
    #[arg(long, value_name = "PATH")]
    pub(crate) tree: Utf8PathBuf,
    /// Bearer token forwarded to the tree source.
    #[arg(long, value_name = "TOKEN", default_value = "")]
    pub(crate) access_token: String,
    /// Controls how the final listing is rendered.
    #[arg(long, value_enum, default_value_t = OutputFormat::Auto)]
    pub(crate) output: OutputFormat,
    /// Steps to replay: a child name to open, `..` to go back, or `!cancel`.
    #[arg(
        value_name = "STEP",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub(crate) steps: Vec<String>,
}
