//! Settings struct definition and default implementation.

use super::types::*;
use crate::patterns::{PatternDescriptor, default_patterns};
use serde::{Deserialize, Serialize};

/// Settings for a brandsmith run.
///
/// Loaded from `brandsmith.yaml` (or `--settings`). Unknown fields in the
/// YAML are ignored for forward compatibility. Built once at startup and
/// passed explicitly into each pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // =========================================================================
    // Layout
    // =========================================================================
    /// Template tree duplicated for every brand.
    #[serde(default = "default_template_root")]
    pub template_root: String,

    /// Directory holding instances; relative paths resolve against the
    /// template root.
    #[serde(default = "default_instances_dir")]
    pub instances_dir: String,

    /// Extra directory globs pruned from the copy, on top of `.git`,
    /// `.github`, the instances dir, and hidden directories.
    #[serde(default)]
    pub prune: Vec<String>,

    // =========================================================================
    // Run loop
    // =========================================================================
    /// Process only the first configured candidate, or all of them.
    #[serde(default)]
    pub run_mode: RunMode,

    // =========================================================================
    // Substitution
    // =========================================================================
    /// Bytes sampled from each file to decide whether it is binary.
    #[serde(default = "default_binary_sample_bytes")]
    pub binary_sample_bytes: usize,

    /// Ordered substitution rules.
    #[serde(default = "default_patterns")]
    pub patterns: Vec<PatternDescriptor>,

    // =========================================================================
    // Build
    // =========================================================================
    /// Ordered build steps; the first failing step stops the build.
    #[serde(default = "default_build_steps")]
    pub build_steps: Vec<BuildStep>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            template_root: default_template_root(),
            instances_dir: default_instances_dir(),
            prune: Vec::new(),
            run_mode: RunMode::default(),
            binary_sample_bytes: default_binary_sample_bytes(),
            patterns: default_patterns(),
            build_steps: default_build_steps(),
        }
    }
}
