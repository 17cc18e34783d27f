//! Filesystem utilities for brandsmith.
//!
//! Tree copying for instance materialization and atomic rewrites for
//! substituted files.

pub mod atomic;
mod copy_tree;

pub use atomic::rewrite_file;
pub use copy_tree::{CopyStats, TreePruner, copy_tree};
