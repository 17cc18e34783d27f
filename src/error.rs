//! Error types for brandsmith.
//!
//! Uses thiserror for derive macros. Every pipeline failure carries enough
//! context (brand, key, step) to be reported without further lookups.

use crate::exit_codes;
use std::fmt;
use thiserror::Error;

/// Pipeline stage a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Reading the brand config and validating `App Username`.
    Identify,
    Materialize,
    Substitute,
    Build,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Identify => "identify",
            Stage::Materialize => "materialize",
            Stage::Substitute => "substitute",
            Stage::Build => "build",
        };
        f.write_str(name)
    }
}

/// Main error type for brandsmith operations.
#[derive(Error, Debug)]
pub enum BrandError {
    /// Invalid arguments, settings, or unreadable input.
    #[error("{0}")]
    UserError(String),

    /// A config block was found but no `Key: Value` lines were parsed from it.
    #[error("config block found but no keys were parsed")]
    ConfigEmpty,

    /// The config has no `App Username` entry.
    #[error("config has no 'App Username' entry")]
    MissingUsername,

    /// `App Username` cannot be used as an instance directory name.
    #[error("invalid App Username '{identifier}': {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    /// Neither the pattern key nor `Default` is present in the config.
    #[error("no value for '{key}' in config for '{brand}' sub-brand")]
    MissingValue { key: String, brand: String },

    /// I/O failure while copying the template tree.
    #[error("failed to materialize instance: {0}")]
    CopyFailure(String),

    /// Read, decode, or write failure on a matched instance file.
    #[error("failed to rewrite instance file: {0}")]
    SubstitutionIo(String),

    /// A build step did not complete successfully.
    #[error("build step {index} ({name}) failed: {message}")]
    BuildStepFailure {
        index: usize,
        name: String,
        message: String,
    },
}

impl BrandError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            BrandError::UserError(_)
            | BrandError::ConfigEmpty
            | BrandError::MissingUsername
            | BrandError::InvalidIdentifier { .. } => exit_codes::USER_ERROR,
            BrandError::MissingValue { .. } => exit_codes::MISSING_VALUE,
            BrandError::CopyFailure(_) | BrandError::SubstitutionIo(_) => {
                exit_codes::FILESYSTEM_FAILURE
            }
            BrandError::BuildStepFailure { .. } => exit_codes::BUILD_FAILURE,
        }
    }

    /// The pipeline stage this error aborts, if it comes from the pipeline.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            BrandError::UserError(_) | BrandError::ConfigEmpty => None,
            BrandError::MissingUsername | BrandError::InvalidIdentifier { .. } => {
                Some(Stage::Identify)
            }
            BrandError::CopyFailure(_) => Some(Stage::Materialize),
            BrandError::MissingValue { .. } | BrandError::SubstitutionIo(_) => {
                Some(Stage::Substitute)
            }
            BrandError::BuildStepFailure { .. } => Some(Stage::Build),
        }
    }
}

/// Result type alias for brandsmith operations.
pub type Result<T> = std::result::Result<T, BrandError>;
