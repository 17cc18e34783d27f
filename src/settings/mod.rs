//! Settings model for brandsmith.
//!
//! This module defines the Settings struct that represents `brandsmith.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for optional fields, and validation of settings values.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::Settings;
pub use types::{BuildStep, RunMode};
