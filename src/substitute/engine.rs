//! Pattern application over a materialized instance.

use super::binary::is_binary;
use crate::brand::BrandConfig;
use crate::error::{BrandError, Result};
use crate::fs::rewrite_file;
use crate::patterns::{CompiledPattern, PatternCatalog};
use glob::{MatchOptions, Pattern};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Counters reported after substitution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstitutionReport {
    /// Text files read and matched against a pattern.
    pub files_scanned: usize,
    /// Files whose content changed and were written back.
    pub files_rewritten: usize,
    /// Files skipped because their sample looked binary.
    pub binary_skipped: usize,
    /// Capture-group spans replaced.
    pub replacements: usize,
}

/// Applies a pattern catalog to instance files.
#[derive(Debug)]
pub struct SubstitutionEngine<'a> {
    catalog: &'a PatternCatalog,
    sample_bytes: usize,
}

/// One glob expansion: the pattern plus the path it was rooted at.
struct WorkItem {
    base: PathBuf,
    pattern: String,
}

impl<'a> SubstitutionEngine<'a> {
    pub fn new(catalog: &'a PatternCatalog, sample_bytes: usize) -> Self {
        Self {
            catalog,
            sample_bytes,
        }
    }

    /// Apply every pattern, in catalog order, inside `instance_root`.
    ///
    /// All values are resolved before any file is touched, so a missing key
    /// writes nothing. After that, the first I/O or decode failure aborts;
    /// files already rewritten stay rewritten.
    ///
    /// # Returns
    ///
    /// * `Ok(SubstitutionReport)` - Counts of scanned and rewritten files
    /// * `Err(BrandError::MissingValue)` - Key absent and no `Default`
    /// * `Err(BrandError::SubstitutionIo)` - Read, decode, or write failure
    pub fn apply(
        &self,
        instance_root: &Path,
        brand: &str,
        config: &BrandConfig,
    ) -> Result<SubstitutionReport> {
        let values = self
            .catalog
            .iter()
            .map(|pattern| {
                config
                    .resolve(pattern.key())
                    .ok_or_else(|| BrandError::MissingValue {
                        key: pattern.key().to_string(),
                        brand: brand.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let canonical_root = instance_root.canonicalize().map_err(|e| {
            BrandError::SubstitutionIo(format!(
                "failed to resolve instance root '{}': {}",
                instance_root.display(),
                e
            ))
        })?;

        let mut report = SubstitutionReport::default();
        for (pattern, value) in self.catalog.iter().zip(values) {
            info!(
                brand,
                key = pattern.key(),
                file = pattern.file_glob(),
                "applying pattern"
            );
            self.apply_pattern(instance_root, &canonical_root, pattern, value, &mut report)?;
        }

        Ok(report)
    }

    fn apply_pattern(
        &self,
        instance_root: &Path,
        canonical_root: &Path,
        pattern: &CompiledPattern,
        value: &str,
        report: &mut SubstitutionReport,
    ) -> Result<()> {
        let mut worklist = vec![WorkItem {
            base: instance_root.join(pattern.file_glob()),
            pattern: rooted_glob(instance_root, pattern.file_glob()),
        }];
        let mut visited_dirs: HashSet<PathBuf> = HashSet::new();
        let mut visited_files: HashSet<PathBuf> = HashSet::new();

        while let Some(item) = worklist.pop() {
            let matches = expand(&item.pattern)?;
            debug!(pattern = %item.pattern, matches = matches.len(), "glob expanded");

            let mut subdirs = Vec::new();
            for path in matches {
                let metadata = fs::symlink_metadata(&path).map_err(|e| io_error("stat", &path, e))?;

                if metadata.file_type().is_symlink() {
                    debug!(path = %path.display(), "skipping symlink");
                    continue;
                }

                if !is_inside(canonical_root, &path)? {
                    warn!(path = %path.display(), "skipping match outside the instance");
                    continue;
                }

                if metadata.is_dir() {
                    if path == item.base || !visited_dirs.insert(path.clone()) {
                        continue;
                    }
                    subdirs.push(path);
                } else if metadata.is_file() {
                    if !visited_files.insert(path.clone()) {
                        continue;
                    }
                    self.process_file(&path, pattern, value, report)?;
                }
            }

            // Reverse so subdirectories are expanded in match order.
            for dir in subdirs.into_iter().rev() {
                worklist.push(WorkItem {
                    pattern: rooted_glob(&dir, pattern.file_glob()),
                    base: dir,
                });
            }
        }

        Ok(())
    }

    fn process_file(
        &self,
        path: &Path,
        pattern: &CompiledPattern,
        value: &str,
        report: &mut SubstitutionReport,
    ) -> Result<()> {
        if is_binary(path, self.sample_bytes).map_err(|e| io_error("sample", path, e))? {
            debug!(path = %path.display(), "skipping binary file");
            report.binary_skipped += 1;
            return Ok(());
        }

        let bytes = fs::read(path).map_err(|e| io_error("read", path, e))?;
        let content = String::from_utf8(bytes).map_err(|e| {
            BrandError::SubstitutionIo(format!(
                "'{}' is not valid UTF-8: {}",
                path.display(),
                e
            ))
        })?;

        report.files_scanned += 1;

        let (rewritten, count) = pattern.rewrite(&content, value);
        report.replacements += count;

        if let Cow::Owned(new_content) = rewritten
            && new_content != content
        {
            rewrite_file(path, new_content.as_bytes())?;
            report.files_rewritten += 1;
            debug!(path = %path.display(), replacements = count, "file rewritten");
        }

        Ok(())
    }
}

/// Glob pattern for `relative_glob` under `base`, with `base` escaped so
/// metacharacters in directory names match literally.
fn rooted_glob(base: &Path, relative_glob: &str) -> String {
    let escaped = Pattern::escape(&base.to_string_lossy());
    format!("{}/{}", escaped.trim_end_matches('/'), relative_glob)
}

fn expand(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob_with(pattern, MATCH_OPTIONS).map_err(|e| {
        BrandError::SubstitutionIo(format!("invalid glob '{}': {}", pattern, e))
    })?;

    paths
        .map(|entry| {
            entry.map_err(|e| {
                BrandError::SubstitutionIo(format!(
                    "failed to read '{}': {}",
                    e.path().display(),
                    e.error()
                ))
            })
        })
        .collect()
}

fn is_inside(canonical_root: &Path, path: &Path) -> Result<bool> {
    let canonical = path.canonicalize().map_err(|e| io_error("resolve", path, e))?;
    Ok(canonical.starts_with(canonical_root))
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> BrandError {
    BrandError::SubstitutionIo(format!("failed to {} '{}': {}", action, path.display(), e))
}
