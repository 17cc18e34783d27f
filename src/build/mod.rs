//! Native build pipeline for a materialized instance.

mod orchestrator;
pub(crate) mod runner;


pub use orchestrator::{BuildOrchestrator, BuildReport};
pub use runner::{CommandRunner, SystemRunner};
