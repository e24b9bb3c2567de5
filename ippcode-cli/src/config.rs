//! Command-line configuration.

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{ArgGroup, Parser};

/// Exit code for invalid command-line arguments.
pub const EXIT_USAGE: i32 = 10;

/// Files the interpreter reads from. At least one must be given; the other
/// is taken from standard input.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "ippcode",
    version,
    about = "Interpret IPPcode22 programs from their XML representation"
)]
#[command(group(
    ArgGroup::new("files")
        .required(true)
        .multiple(true)
        .args(["source", "input"])
))]
pub struct RunConfig {
    /// XML program file (standard input when omitted)
    #[arg(long, value_name = "FILE")]
    pub source: Option<PathBuf>,

    /// File read by READ instructions (standard input when omitted)
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,
}

/// Exit code for an argument parsing outcome: 0 for `--help` and
/// `--version`, [`EXIT_USAGE`] for everything else.
pub fn exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => EXIT_USAGE,
    }
}
