//! Substitution pattern catalog.
//!
//! Each [`PatternDescriptor`] ties a brand config key to a file glob and a
//! regex whose single capture group marks the span to overwrite with the
//! resolved value. The catalog is ordered; rules run in declaration order.

mod catalog;


pub use catalog::{CompiledPattern, PatternCatalog, default_patterns};

use serde::{Deserialize, Serialize};

/// A declarative substitution rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDescriptor {
    /// Brand config key supplying the replacement value.
    pub key: String,

    /// Glob relative to the instance root (`/`-separated, `**` allowed).
    pub file: String,

    /// Regex with exactly one capture group: the span that is replaced.
    pub regex: String,
}

impl PatternDescriptor {
    pub fn new(key: impl Into<String>, file: impl Into<String>, regex: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            file: file.into(),
            regex: regex.into(),
        }
    }
}
