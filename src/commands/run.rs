//! Implementation of the `brandsmith run` command.
//!
//! Collects candidate texts, resolves settings with the command-line
//! overrides applied, drives the pipeline, and prints the run summary.

use super::resolve_settings;
use crate::build::SystemRunner;
use crate::cli::RunArgs;
use crate::error::{BrandError, Result};
use crate::pipeline::{
    Candidate, CandidateOutcome, Pipeline, RunSummary, read_candidate, read_tickets,
};
use crate::settings::{RunMode, Settings};
use std::path::{Path, PathBuf};
use tracing::info;

/// Execute the `brandsmith run` command.
///
/// The returned exit code reflects the first failed candidate, or a user
/// error when only empty config blocks were found.
pub fn cmd_run(settings_file: Option<&Path>, args: RunArgs) -> Result<i32> {
    let mut settings = resolve_settings(settings_file, args.template.as_deref())?;
    apply_overrides(&mut settings, args.mode.as_deref(), args.instances.as_deref())?;

    let candidates = collect_candidates(&args.inputs, args.tickets.as_deref())?;
    info!(
        candidates = candidates.len(),
        mode = %settings.run_mode,
        template = %settings.template_root().display(),
        "starting run"
    );

    let runner = runner_for(&args);
    let mut pipeline = Pipeline::new(&settings, runner)?.skip_build(args.skip_build);
    let summary = pipeline.run_candidates(candidates, settings.run_mode);

    if args.json {
        let json = serde_json::to_string_pretty(&summary.to_json())
            .map_err(|e| BrandError::UserError(format!("failed to serialize summary: {}", e)))?;
        println!("{}", json);
    } else {
        print!("{}", render_summary(&summary));
    }

    Ok(summary.exit_code())
}

/// JSON output keeps stdout clean, so step output is captured there too.
fn runner_for(args: &RunArgs) -> SystemRunner {
    if args.capture_output || args.json {
        SystemRunner::capturing()
    } else {
        SystemRunner::streaming()
    }
}

/// Apply `--mode` and `--instances`, then re-check the result.
fn apply_overrides(
    settings: &mut Settings,
    mode: Option<&str>,
    instances: Option<&Path>,
) -> Result<()> {
    if let Some(mode) = mode {
        settings.run_mode = RunMode::from_str(mode)
            .ok_or_else(|| BrandError::UserError(format!("unknown run mode '{}'", mode)))?;
    }
    if let Some(instances) = instances {
        settings.instances_dir = instances.to_string_lossy().into_owned();
    }
    settings.validate()
}

/// Candidates from files in argument order, then tickets. Stdin when neither
/// is given.
fn collect_candidates(inputs: &[PathBuf], tickets: Option<&Path>) -> Result<Vec<Candidate>> {
    if inputs.is_empty() && tickets.is_none() {
        return Ok(vec![read_candidate(Path::new("-"))?]);
    }

    let mut candidates = inputs
        .iter()
        .map(|path| read_candidate(path))
        .collect::<Result<Vec<_>>>()?;
    if let Some(tickets) = tickets {
        candidates.extend(read_tickets(tickets)?);
    }
    Ok(candidates)
}

fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    for result in &summary.results {
        let line = match &result.outcome {
            CandidateOutcome::NoConfig => format!("  -  {}: no config found", result.label),
            CandidateOutcome::Empty => {
                format!("  !  {}: {}", result.label, BrandError::ConfigEmpty)
            }
            CandidateOutcome::Succeeded(report) => {
                let build = match &report.build {
                    Some(build) => format!("{} build steps", build.steps.len()),
                    None => "build skipped".to_string(),
                };
                format!(
                    "  ok {}: '{}' released to {} ({} files rewritten, {})",
                    result.label,
                    report.brand,
                    report.instance_root.display(),
                    report.substitution.files_rewritten,
                    build
                )
            }
            CandidateOutcome::Failed { brand, error } => {
                let stage = error
                    .stage()
                    .map(|s| format!(" [{}]", s))
                    .unwrap_or_default();
                format!(
                    "  x  {}: '{}' failed{}: {}",
                    result.label,
                    brand.as_deref().unwrap_or("<unknown>"),
                    stage,
                    error
                )
            }
        };
        out.push_str(&line);
        out.push('\n');
    }

    let succeeded = summary.succeeded().count();
    out.push_str(&format!(
        "{} candidate(s) read, {} attempted, {} released\n",
        summary.results.len(),
        summary.attempted(),
        succeeded
    ));
    out
}
