//! Ordered, fail-fast execution of build steps against an instance.

use super::runner::{CommandRunner, Completion, CompletionStatus, Invocation};
use crate::error::{BrandError, Result};
use crate::settings::BuildStep;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Maximum number of output lines kept in a failure message.
pub const FAILURE_OUTPUT_MAX_LINES: usize = 50;

/// Maximum total characters kept in a failure message.
pub const FAILURE_OUTPUT_MAX_CHARS: usize = 4096;

/// Record of a step that completed successfully.
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub name: String,
    pub command: String,
    pub duration: Duration,
}

/// Steps completed by a successful build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub steps: Vec<StepRecord>,
}

/// Runs build steps one at a time through a [`CommandRunner`].
pub struct BuildOrchestrator<'a, R: CommandRunner> {
    steps: &'a [BuildStep],
    runner: R,
}

impl<'a, R: CommandRunner> BuildOrchestrator<'a, R> {
    pub fn new(steps: &'a [BuildStep], runner: R) -> Self {
        Self { steps, runner }
    }

    /// Give back the runner, e.g. to inspect a fake after a run.
    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Run every step in order inside `instance_root`.
    ///
    /// The first step that cannot be parsed, cannot start, or exits
    /// unsuccessfully stops the build; later steps never run and earlier
    /// steps' side effects stay in place.
    ///
    /// # Returns
    ///
    /// * `Ok(BuildReport)` - Every step succeeded
    /// * `Err(BrandError::BuildStepFailure)` - 1-based index and reason of the failed step
    pub fn run(&mut self, instance_root: &Path) -> Result<BuildReport> {
        let mut report = BuildReport::default();

        for (i, step) in self.steps.iter().enumerate() {
            let index = i + 1;
            let name = step_name(step);

            let invocation = resolve_invocation(step, instance_root)
                .map_err(|message| step_failure(index, &name, message))?;

            info!(
                step = index,
                total = self.steps.len(),
                name = %name,
                command = %invocation.display(),
                dir = %invocation.working_dir.display(),
                "running build step"
            );

            let started = Instant::now();
            let completion = self.runner.run(&invocation);
            let duration = started.elapsed();

            log_output(&completion);

            if let Some(message) = failure_message(&completion, &step.command) {
                error!(step = index, name = %name, "build step failed");
                return Err(step_failure(index, &name, message));
            }

            info!(step = index, name = %name, elapsed_ms = duration.as_millis() as u64, "build step finished");
            report.steps.push(StepRecord {
                name,
                command: step.command.clone(),
                duration,
            });
        }

        Ok(report)
    }
}

fn step_name(step: &BuildStep) -> String {
    if step.name.trim().is_empty() {
        step.command.trim().to_string()
    } else {
        step.name.clone()
    }
}

fn step_failure(index: usize, name: &str, message: String) -> BrandError {
    BrandError::BuildStepFailure {
        index,
        name: name.to_string(),
        message,
    }
}

fn resolve_invocation(step: &BuildStep, instance_root: &Path) -> std::result::Result<Invocation, String> {
    let command = step.command.trim();
    if command.is_empty() {
        return Err("command is empty".to_string());
    }

    let args = shell_words::split(command).map_err(|e| {
        format!(
            "failed to parse command: {}\nCommand: {}\nFix: check for unmatched quotes or invalid escape sequences.",
            e, command
        )
    })?;

    let Some((program, args)) = args.split_first() else {
        return Err(format!("command is empty after parsing.\nCommand: {}", command));
    };

    let working_dir = if step.working_dir.is_empty() {
        instance_root.to_path_buf()
    } else {
        instance_root.join(&step.working_dir)
    };

    if !working_dir.is_dir() {
        return Err(format!(
            "working directory '{}' does not exist",
            working_dir.display()
        ));
    }

    // `./gradlew` means the script in the step's directory, not ours.
    let program = if program.contains(['/', '\\']) && Path::new(program).is_relative() {
        working_dir.join(program).to_string_lossy().into_owned()
    } else {
        program.clone()
    };

    Ok(Invocation {
        program,
        args: args.to_vec(),
        working_dir,
    })
}

fn failure_message(completion: &Completion, command: &str) -> Option<String> {
    let mut message = match &completion.status {
        CompletionStatus::Success => return None,
        CompletionStatus::Failed { code: Some(code) } => {
            format!("Command failed with exit code {}\nCommand: {}\n", code, command)
        }
        CompletionStatus::Failed { code: None } => {
            format!("Command terminated by signal\nCommand: {}\n", command)
        }
        CompletionStatus::Spawn { message } => {
            return Some(format!(
                "failed to execute command: {}\nCommand: {}\nFix: ensure the command is installed and in PATH.",
                message, command
            ));
        }
    };

    let combined = if completion.stderr.is_empty() {
        completion.stdout.clone()
    } else {
        format!("{}\n{}", completion.stdout, completion.stderr)
    };

    let truncated = truncate_output(&combined, FAILURE_OUTPUT_MAX_LINES, FAILURE_OUTPUT_MAX_CHARS);
    if !truncated.trim().is_empty() {
        message.push_str("\nOutput (truncated):\n");
        message.push_str(&truncated);
        message.push('\n');
    }

    Some(message)
}

fn log_output(completion: &Completion) {
    for line in completion.stdout.lines() {
        debug!(target: "brandsmith::build::stdout", "{}", line);
    }
    for line in completion.stderr.lines() {
        debug!(target: "brandsmith::build::stderr", "{}", line);
    }
}

/// Keep the last `max_lines` lines, then the last `max_chars` characters.
fn truncate_output(output: &str, max_lines: usize, max_chars: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();

    let relevant_lines: &[&str] = if lines.len() > max_lines {
        &lines[lines.len() - max_lines..]
    } else {
        &lines
    };

    let result = relevant_lines.join("\n");

    if result.len() <= max_chars {
        return result;
    }

    let mut start = result.len() - max_chars;
    while !result.is_char_boundary(start) {
        start += 1;
    }
    format!("...(truncated)...\n{}", &result[start..])
}
