//! Implementation of the `brandsmith extract` command.
//!
//! Prints the parsed config block of a file (or stdin) as pretty JSON,
//! without touching any template or instance.

use crate::brand::{BrandConfig, extract_config};
use crate::cli::ExtractArgs;
use crate::error::{BrandError, Result};
use crate::exit_codes;
use crate::pipeline::read_candidate;
use std::path::Path;
use tracing::info;

/// Execute the `brandsmith extract` command.
pub fn cmd_extract(args: ExtractArgs) -> Result<i32> {
    let path = args.file.as_deref().unwrap_or(Path::new("-"));
    let candidate = read_candidate(path)?;

    match render(&candidate.text)? {
        Some(json) => println!("{}", json),
        None => info!(candidate = %candidate.label, "no config found"),
    }
    Ok(exit_codes::SUCCESS)
}

/// JSON for the config block in `text`, or `None` when there is no block.
fn render(text: &str) -> Result<Option<String>> {
    let Some(config) = extract_config(text) else {
        return Ok(None);
    };
    if config.is_empty() {
        return Err(BrandError::ConfigEmpty);
    }
    to_json(&config).map(Some)
}

fn to_json(config: &BrandConfig) -> Result<String> {
    serde_json::to_string_pretty(config)
        .map_err(|e| BrandError::UserError(format!("failed to serialize config: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_render_block_as_json() {
        let text = "hi\n--- start config ---\nApp Username: acme\nFull Name: Acme Corp\n--- end config ---";

        let json = render(text).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["App Username"], "acme");
        assert_eq!(value["Full Name"], "Acme Corp");
    }

    #[test]
    fn test_render_without_block() {
        assert!(render("nothing to see").unwrap().is_none());
    }

    #[test]
    fn test_render_empty_block_is_error() {
        let err = render("--- start config ---\n\n--- end config ---").unwrap_err();
        assert!(matches!(err, BrandError::ConfigEmpty));
    }

    #[test]
    fn test_extract_from_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("issue.md");
        fs::write(&file, "--- start config ---\nApp Username: acme\n--- end config ---").unwrap();

        let code = cmd_extract(ExtractArgs { file: Some(file) }).unwrap();
        assert_eq!(code, exit_codes::SUCCESS);
    }

    #[test]
    fn test_extract_unreadable_file_is_user_error() {
        let temp = TempDir::new().unwrap();
        let err = cmd_extract(ExtractArgs {
            file: Some(temp.path().join("missing.md")),
        })
        .unwrap_err();
        assert!(matches!(err, BrandError::UserError(_)));
    }
}
