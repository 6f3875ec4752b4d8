//! The aula ingestion pipeline: speaker resolution, merge/upsert policy,
//! and the per-unit orchestrator.
//!
//! Everything here is generic over [`aula_core::store::CanonicalStore`];
//! the orchestrator owns the store handle exclusively and threads it
//! through the merge engine — no ambient global state.

pub mod error;
pub mod merge;
pub mod orchestrator;
pub mod report;
pub mod resolver;

pub use error::UnitError;
pub use orchestrator::{Pipeline, PipelineConfig};
pub use report::{RunReport, UnitCounts, UnitOutcome, UnitReport};

#[cfg(test)]
mod tests;
