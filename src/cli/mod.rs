//! Command line interface for framework_dylib.
//!
//! This module wires argument parsing, validation and coloured output to the
//! `process`, `convert` and `inspect` subcommands.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, ConvertArgs, InspectArgs, ProcessArgs, RuntimeConfig};
pub use output::OutputManager;

use crate::error::{CliError, Result};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let config = RuntimeConfig::from(&args);

    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    match &args.command {
        Command::Process(process) => commands::process(process, &config).await,
        Command::Convert(convert) => commands::convert(convert, &config).await,
        Command::Inspect(inspect) => commands::inspect(inspect, &config).await,
    }
}
