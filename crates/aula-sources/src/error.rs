//! Error types for the aula source readers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Reading the raw unit from disk failed. Unit-level.
  #[error("reading {path}: {source}")]
  Io {
    path:   String,
    #[source]
    source: std::io::Error,
  },

  /// The unit body is not valid JSON. Unit-level.
  #[error("parsing {path}: {source}")]
  Json {
    path:   String,
    #[source]
    source: serde_json::Error,
  },

  /// The unit's filename does not encode a session identity
  /// (`<legislature>__<number>.json`). Unit-level.
  #[error("unit name does not encode a session identity: {0:?}")]
  BadUnitName(String),

  /// A single sub-record fails structural validation: wrong shape or a
  /// missing required field. Record-level — the caller skips the record
  /// and continues with the rest of the unit.
  #[error("malformed record: {0}")]
  MalformedRecord(String),
}

impl Error {
  /// Whether this error is recovered locally by skipping one record, as
  /// opposed to rolling back the whole unit.
  pub fn is_record_level(&self) -> bool {
    matches!(self, Error::MalformedRecord(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
