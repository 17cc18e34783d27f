//! Brand identifier validation.
//!
//! `App Username` comes from free-form ticket text and becomes a directory
//! name under the instances root, so it must be a single, portable path
//! segment before anything touches the filesystem.

use crate::error::{BrandError, Result};

/// Longest identifier accepted (typical filesystem name limit).
pub const MAX_IDENTIFIER_LEN: usize = 255;

const RESERVED_NAMES: &[&str] = &["CON", "PRN", "AUX", "NUL"];

/// Validate that an identifier is usable as one instance directory name.
///
/// Rejects empty names, `.` and `..`, path separators, drive prefixes,
/// leading dots (pruned from copies), trailing dots or spaces, control
/// characters, glob metacharacters, and Windows reserved device names.
pub fn validate_identifier(identifier: &str) -> Result<()> {
    let reject = |reason: &str| {
        Err(BrandError::InvalidIdentifier {
            identifier: identifier.to_string(),
            reason: reason.to_string(),
        })
    };

    if identifier.trim().is_empty() {
        return reject("must not be empty");
    }
    if identifier == "." || identifier == ".." {
        return reject("must not be a relative directory reference");
    }
    if identifier.len() > MAX_IDENTIFIER_LEN {
        return reject("is too long");
    }
    if identifier.contains(['/', '\\']) {
        return reject("must not contain path separators");
    }
    if identifier.contains(':') {
        return reject("must not contain ':'");
    }
    if identifier.starts_with('.') {
        return reject("must not start with '.'");
    }
    if identifier.ends_with('.') || identifier.ends_with(' ') {
        return reject("must not end with '.' or a space");
    }
    if identifier.chars().any(char::is_control) {
        return reject("must not contain control characters");
    }
    if identifier.contains(['*', '?', '[', ']', '<', '>', '|', '"']) {
        return reject("must not contain wildcard or shell metacharacters");
    }
    if is_reserved_name(identifier) {
        return reject("is a reserved device name");
    }

    Ok(())
}

fn is_reserved_name(identifier: &str) -> bool {
    let stem = identifier
        .split_once('.')
        .map_or(identifier, |(stem, _)| stem)
        .to_ascii_uppercase();

    if RESERVED_NAMES.contains(&stem.as_str()) {
        return true;
    }

    ["COM", "LPT"].iter().any(|prefix| {
        stem.strip_prefix(prefix)
            .is_some_and(|n| n.len() == 1 && n.as_bytes()[0].is_ascii_digit() && n != "0")
    })
}
