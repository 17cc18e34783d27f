//! Command implementations for brandsmith.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the settings resolution they share.

mod extract;
mod patterns;
mod run;

use crate::cli::{Cli, Command};
use crate::error::Result;
use crate::settings::Settings;
use std::path::Path;
use tracing::debug;

/// Dispatch a command to its implementation.
///
/// Returns the process exit code on completion. Errors that abort the
/// command before any result is produced are returned as `Err`.
pub fn dispatch(cli: Cli) -> Result<i32> {
    let settings_file = cli.settings.as_deref();
    match cli.command {
        Command::Run(args) => run::cmd_run(settings_file, args),
        Command::Extract(args) => extract::cmd_extract(args),
        Command::Patterns => patterns::cmd_patterns(settings_file),
    }
}

/// Build the settings for a command.
///
/// An explicit settings file wins; otherwise `brandsmith.yaml` is looked up
/// in the template root (the current directory when none is given). A
/// template given on the command line always overrides the file's
/// `template_root`.
pub(crate) fn resolve_settings(
    settings_file: Option<&Path>,
    template: Option<&Path>,
) -> Result<Settings> {
    let settings = match settings_file {
        Some(path) => {
            debug!(path = %path.display(), "loading settings file");
            let mut settings = Settings::load(path)?;
            if let Some(template) = template {
                settings.template_root = template.to_string_lossy().into_owned();
            }
            settings
        }
        None => Settings::discover(template.unwrap_or(Path::new(".")))?,
    };

    debug!(
        template_root = %settings.template_root,
        instances_dir = %settings.instances_dir,
        patterns = settings.patterns.len(),
        build_steps = settings.build_steps.len(),
        "settings resolved"
    );
    Ok(settings)
}
