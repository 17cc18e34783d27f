//! Implementation of the `brandsmith patterns` command.

use super::resolve_settings;
use crate::error::Result;
use crate::exit_codes;
use crate::patterns::PatternCatalog;
use std::path::Path;

/// Execute the `brandsmith patterns` command.
///
/// Lists every compiled pattern in declaration order: key, file glob, regex.
pub fn cmd_patterns(settings_file: Option<&Path>) -> Result<i32> {
    let settings = resolve_settings(settings_file, None)?;
    let catalog = settings.catalog()?;

    print!("{}", render(&catalog));
    Ok(exit_codes::SUCCESS)
}

fn render(catalog: &PatternCatalog) -> String {
    if catalog.is_empty() {
        return "No patterns configured.\n".to_string();
    }

    let key_width = catalog.iter().map(|p| p.key().len()).max().unwrap_or(0);
    let file_width = catalog.iter().map(|p| p.file_glob().len()).max().unwrap_or(0);

    let mut out = String::new();
    for (i, pattern) in catalog.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}. {:key_width$}  {:file_width$}  {}\n",
            i + 1,
            pattern.key(),
            pattern.file_glob(),
            pattern.regex().as_str(),
        ));
    }
    out
}
