//! Config block detection and `Key: Value` parsing.

use super::BrandConfig;
use regex::Regex;
use std::sync::LazyLock;

/// Line opening a config block.
pub const START_SENTINEL: &str = "--- start config ---";

/// Line closing a config block.
pub const END_SENTINEL: &str = "--- end config ---";

// Greedy: first start sentinel through the last end sentinel.
static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?s){}(.*){}",
        regex::escape(START_SENTINEL),
        regex::escape(END_SENTINEL)
    ))
    .expect("config block regex is valid")
});

static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([A-Za-z0-9 ]+): (.*)$").expect("config entry regex is valid")
});

/// Check whether the text carries a config block.
pub fn has_config(text: &str) -> bool {
    BLOCK_RE.is_match(text)
}

/// Extract the brand config from arbitrary text.
///
/// Returns `None` when the text has no config block. A block with no
/// parseable lines yields an empty config; callers treat that as
/// [`BrandError::ConfigEmpty`](crate::error::BrandError::ConfigEmpty).
pub fn extract_config(text: &str) -> Option<BrandConfig> {
    let inner = BLOCK_RE.captures(text)?.get(1)?.as_str();

    let mut config = BrandConfig::new();
    for caps in ENTRY_RE.captures_iter(inner) {
        let key = caps[1].trim();
        if key.is_empty() {
            continue;
        }
        let value = caps[2].replace('\r', "");
        config.insert(key, value.trim());
    }

    Some(config)
}
