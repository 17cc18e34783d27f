//! Settings types and defaults for brandsmith.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How many candidates the run loop processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Stop after the first candidate carrying a non-empty config (default).
    #[default]
    First,
    /// Run the pipeline for every candidate carrying a config.
    All,
}

impl RunMode {
    /// Parse a run mode from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "first" => Some(Self::First),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::First => f.write_str("first"),
            RunMode::All => f.write_str("all"),
        }
    }
}

/// A single build step run against an instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildStep {
    /// Display name for the step (e.g., "npm install").
    pub name: String,

    /// Command to execute (shell-words parsed; no shell).
    pub command: String,

    /// Working directory relative to the instance root (empty: the root).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub working_dir: String,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl BuildStep {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn in_dir(mut self, working_dir: impl Into<String>) -> Self {
        self.working_dir = working_dir.into();
        self
    }
}

/// Settings file name looked up in the template root.
pub const SETTINGS_FILE_NAME: &str = "brandsmith.yaml";

/// Default build pipeline: install JS dependencies, then assemble the
/// Android release.
pub fn default_build_steps() -> Vec<BuildStep> {
    vec![
        BuildStep::new("pwd", "pwd"),
        BuildStep::new("list instance", "ls -al"),
        BuildStep::new("npm install", "npm install"),
        BuildStep::new("assemble release", "./gradlew assembleRelease").in_dir("android"),
        BuildStep::new("list artifacts", "ls app/build/outputs/apk/release/").in_dir("android"),
    ]
}

// Default value functions for serde
pub(crate) fn default_template_root() -> String {
    ".".to_string()
}
pub(crate) fn default_instances_dir() -> String {
    ".instances".to_string()
}
pub(crate) fn default_binary_sample_bytes() -> usize {
    1024
}
