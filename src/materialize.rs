//! Instance materialization.
//!
//! Copies the template tree into `<instances-root>/<identifier>/`. The
//! instances root, version-control and CI directories, and hidden
//! directories are pruned before descent.

use crate::brand::validate_identifier;
use crate::error::{BrandError, Result};
use crate::fs::{CopyStats, TreePruner, copy_tree};
use crate::settings::Settings;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// A freshly materialized instance.
#[derive(Debug, Clone)]
pub struct Instance {
    pub root: PathBuf,
    pub stats: CopyStats,
}

/// Materialize the template tree for one brand.
///
/// Any previous instance with the same identifier is removed first; there
/// is no incremental rebuild. A failure mid-copy leaves a partial instance.
/// The template itself is never removed or overwritten: an instance path
/// that equals or contains the template root, or that lands inside the
/// template anywhere but under a pruned instances root, is refused.
///
/// # Returns
///
/// * `Ok(Instance)` - The populated instance directory
/// * `Err(BrandError::InvalidIdentifier)` - Identifier is not a safe path segment
/// * `Err(BrandError::CopyFailure)` - Overlapping template and instance, or any
///   filesystem failure
pub fn materialize(settings: &Settings, identifier: &str) -> Result<Instance> {
    validate_identifier(identifier)?;

    let template_root = settings.template_root();
    if !template_root.is_dir() {
        return Err(BrandError::CopyFailure(format!(
            "template root '{}' is not a directory",
            template_root.display()
        )));
    }

    let instances_root = settings.instances_root();
    fs::create_dir_all(&instances_root).map_err(|e| {
        BrandError::CopyFailure(format!(
            "failed to create instances root '{}': {}",
            instances_root.display(),
            e
        ))
    })?;

    let layout = Layout::resolve(&template_root, &instances_root, identifier)?;
    layout.check_separation()?;

    let instance_root = settings.instance_path(identifier);
    if instance_root.exists() {
        info!(path = %instance_root.display(), "removing previous instance");
        fs::remove_dir_all(&instance_root).map_err(|e| {
            BrandError::CopyFailure(format!(
                "failed to remove previous instance '{}': {}",
                instance_root.display(),
                e
            ))
        })?;
    }

    let pruner = build_pruner(settings, &layout)?;

    info!(
        brand = identifier,
        from = %template_root.display(),
        to = %instance_root.display(),
        "materializing instance"
    );
    let stats = copy_tree(&template_root, &instance_root, &pruner)?;
    info!(brand = identifier, files = stats.files, "instance materialized");

    Ok(Instance {
        root: instance_root,
        stats,
    })
}

/// Canonical locations of the template, the instances root and the instance.
struct Layout {
    template: PathBuf,
    instances: PathBuf,
    instance: PathBuf,
}

impl Layout {
    fn resolve(template_root: &Path, instances_root: &Path, identifier: &str) -> Result<Self> {
        let template = canonical(template_root)?;
        let instances = canonical(instances_root)?;

        // An existing instance may be a symlink; judge where it points.
        let joined = instances.join(identifier);
        let instance = if fs::symlink_metadata(&joined).is_ok() {
            joined.canonicalize().unwrap_or(joined)
        } else {
            joined
        };

        Ok(Self {
            template,
            instances,
            instance,
        })
    }

    /// Refuse layouts where removing or filling the instance would touch
    /// the template source.
    fn check_separation(&self) -> Result<()> {
        let refuse = |reason: &str| {
            Err(BrandError::CopyFailure(format!(
                "instance '{}' {} template root '{}'",
                self.instance.display(),
                reason,
                self.template.display()
            )))
        };

        if self.template.starts_with(&self.instance) {
            return refuse("is or contains the");
        }
        if self.instances == self.template {
            return refuse("would be a directory of the");
        }
        if self.instance.starts_with(&self.template) && !self.instances.starts_with(&self.template) {
            return refuse("resolves inside the");
        }
        Ok(())
    }

    /// Instances root relative to the template, when it lives inside it.
    fn instances_inside_template(&self) -> Option<&Path> {
        self.instances
            .strip_prefix(&self.template)
            .ok()
            .filter(|relative| !relative.as_os_str().is_empty())
    }
}

fn build_pruner(settings: &Settings, layout: &Layout) -> Result<TreePruner> {
    let mut pruner = TreePruner::new(&settings.prune)?;

    // Only an instances root inside the template can show up in the walk.
    if let Some(relative) = layout.instances_inside_template() {
        if let Some(name) = relative.file_name() {
            pruner = pruner.with_name(name.to_string_lossy());
        }
        pruner = pruner.with_relative_path(relative);
    }

    Ok(pruner)
}

fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|e| {
        BrandError::CopyFailure(format!("failed to resolve '{}': {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn settings_for(template: &Path) -> Settings {
        Settings {
            template_root: template.to_string_lossy().into_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn test_materializes_into_brand_directory() {
        let template = TempDir::new().unwrap();
        write(template.path(), "README.md", "# Template\n");
        write(template.path(), "MyTestApp/app.json", "{\"name\": \"old\",}\n");

        let settings = settings_for(template.path());
        let instance = materialize(&settings, "acme").unwrap();

        assert_eq!(instance.root, template.path().join(".instances").join("acme"));
        assert_eq!(
            fs::read(instance.root.join("README.md")).unwrap(),
            fs::read(template.path().join("README.md")).unwrap()
        );
        assert!(instance.root.join("MyTestApp/app.json").is_file());
        // The source tree is untouched.
        assert!(template.path().join("MyTestApp/app.json").is_file());
    }

    #[test]
    fn test_never_copies_instances_root_into_itself() {
        let template = TempDir::new().unwrap();
        write(template.path(), "index.js", "x");

        let settings = Settings {
            instances_dir: "builds".to_string(),
            ..settings_for(template.path())
        };

        materialize(&settings, "first").unwrap();
        let second = materialize(&settings, "second").unwrap();

        assert!(second.root.join("index.js").is_file());
        assert!(!second.root.join("builds").exists());
        assert_eq!(second.stats.files, 1);
    }

    #[test]
    fn test_instances_root_outside_template() {
        let template = TempDir::new().unwrap();
        let instances = TempDir::new().unwrap();
        write(template.path(), "index.js", "x");
        write(template.path(), ".git/config", "x");

        let settings = Settings {
            instances_dir: instances.path().to_string_lossy().into_owned(),
            ..settings_for(template.path())
        };
        let instance = materialize(&settings, "acme").unwrap();

        assert_eq!(instance.root, instances.path().join("acme"));
        assert!(instance.root.join("index.js").is_file());
        assert!(!instance.root.join(".git").exists());
    }

    #[test]
    fn test_rematerializing_replaces_previous_instance() {
        let template = TempDir::new().unwrap();
        write(template.path(), "index.js", "x");
        let settings = settings_for(template.path());

        let instance = materialize(&settings, "acme").unwrap();
        fs::write(instance.root.join("stale.txt"), "left over").unwrap();

        let instance = materialize(&settings, "acme").unwrap();
        assert!(!instance.root.join("stale.txt").exists());
        assert!(instance.root.join("index.js").is_file());
    }

    #[test]
    fn test_rejects_unsafe_identifier_before_touching_disk() {
        let template = TempDir::new().unwrap();
        let settings = settings_for(template.path());

        let err = materialize(&settings, "../escape").unwrap_err();

        assert!(matches!(err, BrandError::InvalidIdentifier { .. }));
        assert!(!template.path().join(".instances").exists());
    }

    #[test]
    fn test_refuses_instance_that_is_the_template() {
        let parent = TempDir::new().unwrap();
        let template = parent.path().join("app");
        write(&template, "MyTestApp/app.json", "{}\n");

        let settings = Settings {
            instances_dir: "..".to_string(),
            ..settings_for(&template)
        };
        assert!(settings.validate().is_ok());

        let err = materialize(&settings, "app").unwrap_err();

        assert!(matches!(err, BrandError::CopyFailure(_)));
        assert!(template.join("MyTestApp/app.json").is_file());
    }

    #[test]
    fn test_refuses_instances_root_equal_to_template() {
        let template = TempDir::new().unwrap();
        write(template.path(), "MyTestApp/app.json", "{}\n");

        let settings = Settings {
            instances_dir: template.path().to_string_lossy().into_owned(),
            ..settings_for(template.path())
        };

        let err = materialize(&settings, "MyTestApp").unwrap_err();

        assert!(matches!(err, BrandError::CopyFailure(_)));
        assert!(template.path().join("MyTestApp/app.json").is_file());
    }

    #[test]
    fn test_sibling_instances_root_is_allowed() {
        let parent = TempDir::new().unwrap();
        let template = parent.path().join("app");
        write(&template, "index.js", "x");

        let settings = Settings {
            instances_dir: "..".to_string(),
            ..settings_for(&template)
        };
        let instance = materialize(&settings, "acme").unwrap();

        assert!(instance.root.join("index.js").is_file());
        assert!(template.join("index.js").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_refuses_instance_symlinked_into_template() {
        let template = TempDir::new().unwrap();
        let instances = TempDir::new().unwrap();
        write(template.path(), "src/index.js", "x");
        std::os::unix::fs::symlink(template.path().join("src"), instances.path().join("acme"))
            .unwrap();

        let settings = Settings {
            instances_dir: instances.path().to_string_lossy().into_owned(),
            ..settings_for(template.path())
        };

        let err = materialize(&settings, "acme").unwrap_err();

        assert!(matches!(err, BrandError::CopyFailure(_)));
        assert!(template.path().join("src/index.js").is_file());
    }

    #[test]
    fn test_external_instances_root_name_is_not_pruned_in_template() {
        let template = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let instances = out.path().join("release");
        write(
            template.path(),
            "android/app/src/release/AndroidManifest.xml",
            "<manifest/>",
        );

        let settings = Settings {
            instances_dir: instances.to_string_lossy().into_owned(),
            ..settings_for(template.path())
        };
        let instance = materialize(&settings, "acme").unwrap();

        assert!(
            instance
                .root
                .join("android/app/src/release/AndroidManifest.xml")
                .is_file()
        );
    }

    #[test]
    fn test_missing_template_is_copy_failure() {
        let template = TempDir::new().unwrap();
        let settings = settings_for(&template.path().join("missing"));

        let err = materialize(&settings, "acme").unwrap_err();
        assert!(matches!(err, BrandError::CopyFailure(_)));
    }
}
