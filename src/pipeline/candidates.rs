//! Candidate texts fed to the run loop.
//!
//! A candidate is one raw string that may carry a config block. They come
//! from plain files, stdin, or ticket exports; the loop itself does not care
//! which.

use crate::brand::Ticket;
use crate::error::{BrandError, Result};
use std::io::Read;
use std::path::Path;

/// One raw text that may carry a config block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Where the text came from, for logs and the run summary.
    pub label: String,
    pub text: String,
}

impl Candidate {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Read a candidate from a file, or from stdin when the path is `-`.
pub fn read_candidate(path: &Path) -> Result<Candidate> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| BrandError::UserError(format!("failed to read stdin: {}", e)))?;
        return Ok(Candidate::new("<stdin>", text));
    }

    let text = std::fs::read_to_string(path).map_err(|e| {
        BrandError::UserError(format!(
            "failed to read candidate '{}': {}",
            path.display(),
            e
        ))
    })?;
    Ok(Candidate::new(path.display().to_string(), text))
}

/// Parse a JSON array of tickets into candidates, one per ticket.
///
/// Each ticket contributes its newest comment carrying a config block, else
/// its body. Tickets with no block still yield a candidate (its body) so the
/// run summary lists them.
pub fn tickets_from_json(json: &str) -> Result<Vec<Candidate>> {
    let tickets: Vec<Ticket> = serde_json::from_str(json)
        .map_err(|e| BrandError::UserError(format!("failed to parse tickets JSON: {}", e)))?;

    Ok(tickets
        .into_iter()
        .enumerate()
        .map(|(i, ticket)| {
            let label = if ticket.title.is_empty() {
                format!("ticket #{}", i + 1)
            } else {
                format!("ticket '{}'", ticket.title)
            };
            let text = ticket.config_text().unwrap_or(&ticket.body).to_string();
            Candidate::new(label, text)
        })
        .collect())
}

/// Load a tickets JSON file.
pub fn read_tickets(path: &Path) -> Result<Vec<Candidate>> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        BrandError::UserError(format!(
            "failed to read tickets file '{}': {}",
            path.display(),
            e
        ))
    })?;
    tickets_from_json(&json)
}
