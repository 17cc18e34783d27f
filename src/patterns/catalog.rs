//! Default catalog and compiled pattern matching.

use super::PatternDescriptor;
use crate::error::{BrandError, Result};
use regex::Regex;
use std::borrow::Cow;

/// The stock catalog: rebrand the app manifest name and every display name.
pub fn default_patterns() -> Vec<PatternDescriptor> {
    vec![
        PatternDescriptor::new("Full Name", "MyTestApp/app.json", r#""name": "([^"]+)","#),
        PatternDescriptor::new(
            "App Name",
            "MyTestApp/app.json",
            r#""displayName": "([^"]+)","#,
        ),
        PatternDescriptor::new("App Name", "*", r#""displayName": "([^"]+)","#),
    ]
}

/// A pattern with its regex compiled and its file glob normalized.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    descriptor: PatternDescriptor,
    file_glob: String,
    regex: Regex,
}

impl CompiledPattern {
    /// Compile and validate a single descriptor.
    ///
    /// # Returns
    ///
    /// * `Err(BrandError::UserError)` - Empty key, escaping or malformed file
    ///   glob, invalid regex, or a regex without exactly one capture group
    pub fn compile(descriptor: &PatternDescriptor) -> Result<Self> {
        if descriptor.key.trim().is_empty() {
            return Err(BrandError::UserError(format!(
                "pattern for file '{}' has an empty key",
                descriptor.file
            )));
        }

        let file_glob = normalize_file_glob(&descriptor.file)?;

        let regex = Regex::new(&descriptor.regex).map_err(|e| {
            BrandError::UserError(format!(
                "invalid regex for pattern '{}': '{}' - {}\n\
                 Fix: edit the settings file and correct this pattern.",
                descriptor.key, descriptor.regex, e
            ))
        })?;

        // captures_len counts the implicit whole-match group.
        let groups = regex.captures_len() - 1;
        if groups != 1 {
            return Err(BrandError::UserError(format!(
                "regex for pattern '{}' must have exactly one capture group, found {}: '{}'",
                descriptor.key, groups, descriptor.regex
            )));
        }

        Ok(Self {
            descriptor: descriptor.clone(),
            file_glob,
            regex,
        })
    }

    pub fn key(&self) -> &str {
        &self.descriptor.key
    }

    /// File glob relative to the instance root, `/`-separated.
    pub fn file_glob(&self) -> &str {
        &self.file_glob
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Replace the capture-group span of every match with `value`.
    ///
    /// Text outside the capture group, including the rest of each match, is
    /// kept as is. Returns the new content and the number of replacements.
    pub fn rewrite<'a>(&self, content: &'a str, value: &str) -> (Cow<'a, str>, usize) {
        let mut output = String::with_capacity(content.len());
        let mut last = 0;
        let mut count = 0;

        for caps in self.regex.captures_iter(content) {
            let Some(span) = caps.get(1) else {
                continue;
            };
            output.push_str(&content[last..span.start()]);
            output.push_str(value);
            last = span.end();
            count += 1;
        }

        if count == 0 {
            return (Cow::Borrowed(content), 0);
        }

        output.push_str(&content[last..]);
        (Cow::Owned(output), count)
    }
}

/// Ordered, compiled set of substitution rules.
#[derive(Debug, Clone, Default)]
pub struct PatternCatalog {
    patterns: Vec<CompiledPattern>,
}

impl PatternCatalog {
    /// Compile every descriptor, keeping declaration order.
    pub fn compile(descriptors: &[PatternDescriptor]) -> Result<Self> {
        let patterns = descriptors
            .iter()
            .map(CompiledPattern::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledPattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn normalize_file_glob(file: &str) -> Result<String> {
    let normalized = file.trim().replace('\\', "/");

    let reject = |reason: &str| {
        Err(BrandError::UserError(format!(
            "invalid file glob '{}': {}",
            file, reason
        )))
    };

    if normalized.is_empty() {
        return reject("must not be empty");
    }
    if normalized.starts_with('/') || normalized.chars().nth(1) == Some(':') {
        return reject("must be relative to the instance root");
    }
    if normalized.split('/').any(|segment| segment == "..") {
        return reject("must not contain '..' segments");
    }
    if let Err(e) = glob::Pattern::new(&normalized) {
        return reject(&e.to_string());
    }

    Ok(normalized)
}
