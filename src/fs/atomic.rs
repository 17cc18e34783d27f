//! Atomic in-place rewrites of instance files.
//!
//! All rewrites follow this pattern:
//! 1. Write content to a uniquely named temporary file in the same directory
//! 2. Copy the original file's permissions onto the temporary file
//! 3. Sync the file to disk (fsync)
//! 4. Persist (rename) it over the original
//!
//! The temporary name is chosen by `tempfile` and never collides with an
//! existing entry. A failed rewrite removes it; a crash can leave a
//! `.brandsmith-*.tmp` sibling behind but never a truncated target.

use crate::error::{BrandError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Prefix of the temporary siblings created during a rewrite.
const TEMP_PREFIX: &str = ".brandsmith-";

/// Atomically replace the content of an existing file, keeping its
/// permissions.
///
/// # Returns
///
/// * `Ok(())` - On successful rewrite
/// * `Err(BrandError::SubstitutionIo)` - On metadata, write, or rename failure
pub fn rewrite_file<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    let permissions = fs::metadata(path)
        .map_err(|e| {
            BrandError::SubstitutionIo(format!(
                "failed to read metadata of '{}': {}",
                path.display(),
                e
            ))
        })?
        .permissions();

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = write_and_sync(parent, content, permissions)?;

    temp.persist(path).map_err(|e| {
        BrandError::SubstitutionIo(format!(
            "failed to atomically replace '{}': {}",
            path.display(),
            e.error
        ))
    })?;

    Ok(())
}

/// Create a unique temporary file in `dir` holding `content`.
///
/// The file is deleted when the returned handle drops without being
/// persisted, so every error path cleans up after itself.
fn write_and_sync(
    dir: &Path,
    content: &[u8],
    permissions: fs::Permissions,
) -> Result<NamedTempFile> {
    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| {
            BrandError::SubstitutionIo(format!(
                "failed to create temporary file in '{}': {}",
                dir.display(),
                e
            ))
        })?;

    temp.write_all(content).map_err(|e| {
        BrandError::SubstitutionIo(format!("failed to write to temporary file: {}", e))
    })?;

    temp.as_file().set_permissions(permissions).map_err(|e| {
        BrandError::SubstitutionIo(format!("failed to copy permissions: {}", e))
    })?;

    temp.as_file().sync_all().map_err(|e| {
        BrandError::SubstitutionIo(format!("failed to sync temporary file to disk: {}", e))
    })?;

    Ok(temp)
}
