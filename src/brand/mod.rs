//! Brand configuration parsed from ticket text.
//!
//! A brand config is a flat `Key: Value` mapping carried inside a
//! sentinel-delimited block. `App Username` names the instance; `Default`
//! supplies a value for any pattern key the config does not set.

mod extract;
mod identifier;
mod ticket;


pub use extract::{END_SENTINEL, START_SENTINEL, extract_config};
pub use identifier::validate_identifier;
pub use ticket::Ticket;

use crate::error::{BrandError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Config key naming the brand and its instance directory.
pub const USERNAME_KEY: &str = "App Username";

/// Config key used as a fallback for pattern keys missing from the config.
pub const DEFAULT_KEY: &str = "Default";

/// Parsed brand configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandConfig {
    entries: BTreeMap<String, String>,
}

impl BrandConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, replacing any previous value (last occurrence wins).
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Raw `App Username` value, if present.
    pub fn username(&self) -> Option<&str> {
        self.get(USERNAME_KEY)
    }

    /// The validated brand identifier used as the instance directory name.
    ///
    /// # Returns
    ///
    /// * `Err(BrandError::MissingUsername)` - No `App Username` entry
    /// * `Err(BrandError::InvalidIdentifier)` - Not a safe single path segment
    pub fn identifier(&self) -> Result<&str> {
        let username = self.username().ok_or(BrandError::MissingUsername)?;
        validate_identifier(username)?;
        Ok(username)
    }

    /// Resolve the value for a pattern key, falling back to `Default`.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.get(key).or_else(|| self.get(DEFAULT_KEY))
    }

    /// Render the config as a sentinel-delimited block.
    pub fn to_block(&self) -> String {
        let mut block = String::new();
        block.push_str(START_SENTINEL);
        block.push('\n');
        for (key, value) in self.iter() {
            block.push_str(key);
            block.push_str(": ");
            block.push_str(value);
            block.push('\n');
        }
        block.push_str(END_SENTINEL);
        block.push('\n');
        block
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BrandConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut config = BrandConfig::new();
        for (key, value) in iter {
            config.insert(key, value);
        }
        config
    }
}
