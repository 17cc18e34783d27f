//! Brand value substitution inside a materialized instance.
//!
//! Each catalog pattern is expanded as a glob under the instance root. Matched
//! directories are re-expanded with the same pattern rooted at them, using an
//! explicit worklist. Matched text files have every capture-group span
//! replaced with the resolved config value; binary files are left alone.

mod binary;
mod engine;


pub use engine::{SubstitutionEngine, SubstitutionReport};
