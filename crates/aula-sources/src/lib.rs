//! Source readers for the two aula raw feeds.
//!
//! Converts raw per-source JSON records into [`aula_core`] domain types.
//! Pure synchronous; no HTTP or database dependencies. Structural
//! validation happens here, at the boundary, so malformed shapes surface as
//! typed [`Error::MalformedRecord`] classifications rather than failures
//! deeper in the pipeline.

pub mod error;
pub mod profile;
pub mod transcript;

use std::path::{Path, PathBuf};

pub use error::{Error, Result};

/// The unit identity used in logs: the file name, without its directory.
pub fn unit_name(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.display().to_string())
}

/// Discover the raw units in a source directory: every `*.json` file,
/// sorted by name so runs are deterministic.
pub fn discover_units(dir: &Path) -> Result<Vec<PathBuf>> {
  let entries = std::fs::read_dir(dir).map_err(|source| Error::Io {
    path: dir.display().to_string(),
    source,
  })?;

  let mut units = Vec::new();
  for entry in entries {
    let entry = entry.map_err(|source| Error::Io {
      path: dir.display().to_string(),
      source,
    })?;
    let path = entry.path();
    if path.extension().is_some_and(|ext| ext == "json") {
      units.push(path);
    }
  }
  units.sort();
  Ok(units)
}
