//! CLI argument parsing for brandsmith.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Brandsmith: produce white-label app releases from a template project.
///
/// Each brand is described by a config block pasted into an issue or ticket:
/// - The block is parsed into key/value pairs
/// - The template is copied into a per-brand instance directory
/// - Brand values are substituted into the instance
/// - The configured build steps run inside the instance
#[derive(Parser, Debug)]
#[command(name = "brandsmith")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log debug detail (glob matches, per-file decisions).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Settings file to use instead of `brandsmith.yaml` in the template root.
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for brandsmith.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the release pipeline over candidate texts.
    ///
    /// Candidates are read from the given files (`-` for stdin) and from a
    /// tickets export. With no inputs at all, stdin is read.
    Run(RunArgs),

    /// Print the config block found in a file (or stdin) as JSON.
    Extract(ExtractArgs),

    /// List the substitution patterns in effect.
    Patterns,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Files holding candidate texts, in order. `-` reads stdin.
    #[arg(value_name = "FILES")]
    pub inputs: Vec<PathBuf>,

    /// JSON export of tickets (`[{"title", "body", "comments"}]`).
    #[arg(long, value_name = "FILE")]
    pub tickets: Option<PathBuf>,

    /// Stop after the first configured candidate, or process all of them.
    #[arg(long, value_parser = ["first", "all"])]
    pub mode: Option<String>,

    /// Template project root (defaults to the current directory).
    #[arg(long, value_name = "DIR")]
    pub template: Option<PathBuf>,

    /// Directory receiving instances.
    #[arg(long, value_name = "DIR")]
    pub instances: Option<PathBuf>,

    /// Materialize and substitute only; do not run build steps.
    #[arg(long)]
    pub skip_build: bool,

    /// Capture build step output and show it only when a step fails.
    #[arg(long)]
    pub capture_output: bool,

    /// Print the run summary as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `extract` command.
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// File to read; stdin when omitted or `-`.
    pub file: Option<PathBuf>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_run_minimal() {
        let cli = Cli::try_parse_from(["brandsmith", "run"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert!(args.inputs.is_empty());
            assert!(args.tickets.is_none());
            assert!(args.mode.is_none());
            assert!(!args.skip_build);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_full() {
        let cli = Cli::try_parse_from([
            "brandsmith",
            "-v",
            "run",
            "issue.md",
            "-",
            "--tickets",
            "tickets.json",
            "--mode",
            "all",
            "--template",
            "app",
            "--instances",
            "/tmp/out",
            "--skip-build",
            "--json",
        ])
        .unwrap();
        assert!(cli.verbose);
        if let Command::Run(args) = cli.command {
            assert_eq!(args.inputs, vec![PathBuf::from("issue.md"), PathBuf::from("-")]);
            assert_eq!(args.tickets, Some(PathBuf::from("tickets.json")));
            assert_eq!(args.mode.as_deref(), Some("all"));
            assert_eq!(args.template, Some(PathBuf::from("app")));
            assert_eq!(args.instances, Some(PathBuf::from("/tmp/out")));
            assert!(args.skip_build);
            assert!(args.json);
            assert!(!args.capture_output);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["brandsmith", "run", "--mode", "some"]).is_err());
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["brandsmith", "patterns", "-q", "--settings", "b.yaml"]).unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.settings, Some(PathBuf::from("b.yaml")));
        assert!(matches!(cli.command, Command::Patterns));
    }

    #[test]
    fn parse_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["brandsmith", "-v", "-q", "patterns"]).is_err());
    }

    #[test]
    fn parse_extract() {
        let cli = Cli::try_parse_from(["brandsmith", "extract", "issue.md"]).unwrap();
        if let Command::Extract(args) = cli.command {
            assert_eq!(args.file, Some(PathBuf::from("issue.md")));
        } else {
            panic!("Expected Extract command");
        }

        let cli = Cli::try_parse_from(["brandsmith", "extract"]).unwrap();
        assert!(matches!(cli.command, Command::Extract(ExtractArgs { file: None })));
    }

    #[test]
    fn parse_missing_subcommand_fails() {
        assert!(Cli::try_parse_from(["brandsmith"]).is_err());
    }
}
