//! Settings loading, validation, and path resolution.

use super::model::Settings;
use super::types::SETTINGS_FILE_NAME;
use crate::error::{BrandError, Result};
use crate::patterns::PatternCatalog;
use globset::Glob;
use std::path::{Component, Path, PathBuf};

impl Settings {
    /// Load settings from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - Successfully loaded and validated settings
    /// * `Err(BrandError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            BrandError::UserError(format!(
                "failed to read settings file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load `brandsmith.yaml` from a template root, or fall back to defaults
    /// rooted there when the file does not exist.
    pub fn discover<P: AsRef<Path>>(template_root: P) -> Result<Self> {
        let template_root = template_root.as_ref();
        let path = template_root.join(SETTINGS_FILE_NAME);

        let mut settings = if path.is_file() {
            Self::load(&path)?
        } else {
            Self::default()
        };

        // A settings file inside the template describes that template.
        settings.template_root = template_root.to_string_lossy().into_owned();
        Ok(settings)
    }

    /// Parse settings from a YAML string.
    ///
    /// A document with no content (blank or comments only) yields defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let blank = yaml
            .lines()
            .map(str::trim)
            .all(|line| line.is_empty() || line.starts_with('#') || line == "---");
        if blank {
            return Ok(Self::default());
        }

        let settings: Settings = serde_yaml::from_str(yaml)
            .map_err(|e| BrandError::UserError(format!("failed to parse settings YAML: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `instances_dir` must be non-empty and must not be the template root
    /// - `binary_sample_bytes` must be positive
    /// - `prune` entries must be valid globs
    /// - every pattern must compile
    /// - every build step needs a command and a working dir inside the instance
    pub fn validate(&self) -> Result<()> {
        if self.instances_dir.trim().is_empty() {
            return Err(BrandError::UserError(
                "settings validation failed: instances_dir must be non-empty".to_string(),
            ));
        }

        if Path::new(&self.instances_dir)
            .components()
            .all(|c| matches!(c, Component::CurDir))
        {
            return Err(BrandError::UserError(
                "settings validation failed: instances_dir must not be the template root"
                    .to_string(),
            ));
        }

        if self.binary_sample_bytes == 0 {
            return Err(BrandError::UserError(
                "settings validation failed: binary_sample_bytes must be greater than 0"
                    .to_string(),
            ));
        }

        for pattern in &self.prune {
            Glob::new(pattern).map_err(|e| {
                BrandError::UserError(format!(
                    "settings validation failed: invalid prune glob '{}': {}",
                    pattern, e
                ))
            })?;
        }

        self.catalog()?;

        for (i, step) in self.build_steps.iter().enumerate() {
            let label = if step.name.is_empty() {
                format!("#{}", i + 1)
            } else {
                format!("'{}'", step.name)
            };

            if step.command.trim().is_empty() {
                return Err(BrandError::UserError(format!(
                    "settings validation failed: build step {} has an empty command",
                    label
                )));
            }

            if !is_contained_relative(&step.working_dir) {
                return Err(BrandError::UserError(format!(
                    "settings validation failed: build step {} working_dir '{}' must be a relative path inside the instance",
                    label, step.working_dir
                )));
            }
        }

        Ok(())
    }

    /// Compile the pattern catalog.
    pub fn catalog(&self) -> Result<PatternCatalog> {
        PatternCatalog::compile(&self.patterns)
    }

    pub fn template_root(&self) -> PathBuf {
        PathBuf::from(&self.template_root)
    }

    /// Directory holding every instance.
    pub fn instances_root(&self) -> PathBuf {
        let dir = Path::new(&self.instances_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.template_root().join(dir)
        }
    }

    /// Instance directory for an already validated brand identifier.
    pub fn instance_path(&self, identifier: &str) -> PathBuf {
        self.instances_root().join(identifier)
    }
}

fn is_contained_relative(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
