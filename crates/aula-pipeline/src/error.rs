//! Error types for the aula pipeline.
//!
//! Record-level problems (malformed sub-record, empty content, ambiguous
//! surname match) never surface here — they are recovered locally and
//! counted as skips. `UnitError` is the only category that aborts a unit:
//! it rolls the unit's transaction back, and the orchestrator moves on to
//! the next unit. Nothing is fatal to the overall run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnitError {
  /// Reading or parsing the raw unit failed.
  #[error("source error: {0}")]
  Source(#[from] aula_sources::Error),

  /// A canonical-store operation failed mid-unit.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl UnitError {
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    UnitError::Store(Box::new(err))
  }
}
