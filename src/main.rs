//! Brandsmith: white-label release pipeline for a template app project.
//!
//! This is the main entry point for the `brandsmith` CLI. It parses
//! arguments, sets up logging, dispatches to the appropriate command handler,
//! and handles errors with proper exit codes.

mod brand;
mod build;
mod cli;
mod commands;
mod error;
mod exit_codes;
mod fs;
mod logging;
mod materialize;
mod patterns;
mod pipeline;
mod settings;
mod substitute;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init(cli.verbose, cli.quiet);

    match commands::dispatch(cli) {
        Ok(code) => ExitCode::from(code as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}
