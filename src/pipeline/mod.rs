//! Pipeline coordination.
//!
//! `run_brand` sequences materialize → substitute → build for one brand and
//! stops at the first failing stage. `run_candidates` walks candidate texts
//! until the run mode says to stop.

mod candidates;
mod coordinator;

#[cfg(test)]
mod tests;

pub use candidates::{Candidate, read_candidate, read_tickets};
pub use coordinator::{CandidateOutcome, Pipeline, RunSummary};
