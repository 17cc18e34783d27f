//! Recursive tree copy with directory pruning.

use crate::error::{BrandError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory names never copied, at any depth.
const ALWAYS_PRUNED: &[&str] = &[".git", ".github"];

/// Decides which entries of a source tree are left out of a copy.
///
/// Pruned directories are cut before descent, so nothing beneath them is
/// visited.
#[derive(Debug, Clone)]
pub struct TreePruner {
    names: Vec<String>,
    relative_paths: Vec<PathBuf>,
    globs: GlobSet,
}

impl TreePruner {
    /// Build a pruner with the fixed exclusions plus extra globs.
    ///
    /// Globs match either an entry's name or its path relative to the root.
    pub fn new(extra_globs: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();

        for pattern in extra_globs {
            let normalized = pattern.trim().replace('\\', "/");
            if normalized.is_empty() {
                continue;
            }
            let glob = Glob::new(&normalized).map_err(|e| {
                BrandError::UserError(format!("invalid prune glob '{}': {}", pattern, e))
            })?;
            builder.add(glob);
        }

        let globs = builder
            .build()
            .map_err(|e| BrandError::UserError(format!("invalid prune globs: {}", e)))?;

        Ok(Self {
            names: ALWAYS_PRUNED.iter().map(|s| s.to_string()).collect(),
            relative_paths: Vec::new(),
            globs,
        })
    }

    /// Also prune every directory with this name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Also prune the entry at this path, relative to the copy root.
    pub fn with_relative_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.relative_paths.push(path.into());
        self
    }

    /// Whether an entry (given by its path relative to the root) is pruned.
    pub fn is_pruned(&self, relative: &Path, is_dir: bool) -> bool {
        let name = relative
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if is_dir && (name.starts_with('.') || self.names.iter().any(|n| *n == name)) {
            return true;
        }

        if self.relative_paths.iter().any(|p| p == relative) {
            return true;
        }

        self.globs.is_match(&*name) || self.globs.is_match(relative)
    }
}

/// Counters reported after a tree copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub directories: usize,
    pub files: usize,
    pub symlinks: usize,
    pub bytes: u64,
}

/// Copy every non-pruned entry of `src` into `dst`, preserving structure and
/// file bytes.
///
/// Not transactional: on error, whatever was copied so far stays in `dst`.
///
/// # Returns
///
/// * `Ok(CopyStats)` - Counts of copied entries
/// * `Err(BrandError::CopyFailure)` - Any walk, create, or copy failure
pub fn copy_tree(src: &Path, dst: &Path, pruner: &TreePruner) -> Result<CopyStats> {
    fs::create_dir_all(dst).map_err(|e| {
        BrandError::CopyFailure(format!(
            "failed to create directory '{}': {}",
            dst.display(),
            e
        ))
    })?;

    let mut stats = CopyStats::default();

    let walker = WalkDir::new(src)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_pruned_entry(src, e, pruner));

    for entry in walker {
        let entry = entry.map_err(|e| {
            BrandError::CopyFailure(format!("failed to read '{}': {}", src.display(), e))
        })?;

        let relative = entry.path().strip_prefix(src).map_err(|e| {
            BrandError::CopyFailure(format!(
                "entry '{}' is outside '{}': {}",
                entry.path().display(),
                src.display(),
                e
            ))
        })?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| copy_error("create directory", &target, e))?;
            stats.directories += 1;
        } else if file_type.is_file() {
            let bytes = fs::copy(entry.path(), &target)
                .map_err(|e| copy_error("copy file", entry.path(), e))?;
            stats.files += 1;
            stats.bytes += bytes;
        } else if file_type.is_symlink() {
            if copy_symlink(entry.path(), &target)? {
                stats.symlinks += 1;
            }
        } else {
            warn!(path = %entry.path().display(), "skipping special file");
        }
    }

    debug!(
        directories = stats.directories,
        files = stats.files,
        symlinks = stats.symlinks,
        bytes = stats.bytes,
        "tree copied"
    );

    Ok(stats)
}

fn is_pruned_entry(root: &Path, entry: &DirEntry, pruner: &TreePruner) -> bool {
    let Ok(relative) = entry.path().strip_prefix(root) else {
        return false;
    };
    let pruned = pruner.is_pruned(relative, entry.file_type().is_dir());
    if pruned {
        debug!(path = %relative.display(), "pruned from copy");
    }
    pruned
}

fn copy_error(action: &str, path: &Path, e: std::io::Error) -> BrandError {
    BrandError::CopyFailure(format!("failed to {} '{}': {}", action, path.display(), e))
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<bool> {
    let link = fs::read_link(src).map_err(|e| copy_error("read symlink", src, e))?;
    std::os::unix::fs::symlink(&link, dst).map_err(|e| copy_error("create symlink", dst, e))?;
    Ok(true)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, _dst: &Path) -> Result<bool> {
    warn!(path = %src.display(), "skipping symlink");
    Ok(false)
}
