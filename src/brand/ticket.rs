//! Ticket documents exported from the issue tracker.

use super::extract::has_config;
use serde::{Deserialize, Serialize};

/// One issue-tracker ticket: its body plus comments in posting order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ticket {
    pub title: String,
    pub body: String,
    pub comments: Vec<String>,
}

impl Ticket {
    /// Pick the text carrying this ticket's config block.
    ///
    /// Comments are scanned newest first so a follow-up comment overrides
    /// the original request; the body is used only when no comment has a
    /// block.
    pub fn config_text(&self) -> Option<&str> {
        self.comments
            .iter()
            .rev()
            .map(String::as_str)
            .find(|comment| has_config(comment))
            .or_else(|| has_config(&self.body).then_some(self.body.as_str()))
    }
}
