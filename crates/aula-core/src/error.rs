//! Error types for `aula-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown chamber code: {0:?}")]
  UnknownChamber(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
