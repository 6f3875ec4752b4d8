//! Reader for the parliamentary transcript feed.
//!
//! One JSON object per session file. The body maps topic titles to ordered
//! intervention arrays; the session identity comes from the filename stem
//! (`<legislature>__<number>`) plus a per-run chamber, never from the body.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use aula_core::{
  entity::{Chamber, Session},
  id::SessionId,
  normalize::parse_date_soft,
};

use crate::error::{Error, Result};

// ─── Session identity ────────────────────────────────────────────────────────

/// The identity triple a transcript unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionIdentity {
  pub legislature:    u32,
  pub chamber:        Chamber,
  pub session_number: u32,
}

impl SessionIdentity {
  pub fn session_id(&self) -> SessionId {
    SessionId::new(self.legislature, self.chamber, self.session_number)
  }
}

/// Parse `"19__347"` into (legislature 19, session 347).
fn parse_unit_stem(stem: &str) -> Result<(u32, u32)> {
  let (leg, num) = stem
    .split_once("__")
    .ok_or_else(|| Error::BadUnitName(stem.to_owned()))?;
  let legislature = leg
    .parse()
    .map_err(|_| Error::BadUnitName(stem.to_owned()))?;
  let session_number = num
    .parse()
    .map_err(|_| Error::BadUnitName(stem.to_owned()))?;
  Ok((legislature, session_number))
}

// ─── Raw record shapes ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawTranscript {
  #[serde(default)]
  date:     Option<String>,
  #[serde(default)]
  contents: serde_json::Map<String, Value>,
}

/// One topic as read from the unit: a title plus its raw intervention
/// array. Interventions are validated one at a time so a malformed entry
/// skips only itself.
#[derive(Debug, Clone)]
pub struct RawTopic {
  pub title:         String,
  pub interventions: Vec<Value>,
}

/// A structurally valid intervention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intervention {
  pub speaker: String,
  pub text:    String,
}

impl Intervention {
  /// Validate one raw intervention. Anything that is not a JSON object is
  /// a malformed record; a missing speaker defaults to `"Unknown"` and a
  /// missing text to empty (the pipeline then skips empty text).
  pub fn from_value(value: &Value) -> Result<Self> {
    let obj = value
      .as_object()
      .ok_or_else(|| Error::MalformedRecord(format!("non-object intervention: {value}")))?;

    let speaker = obj
      .get("speaker")
      .and_then(Value::as_str)
      .unwrap_or("Unknown")
      .to_owned();
    let text = obj
      .get("text")
      .and_then(Value::as_str)
      .unwrap_or_default()
      .to_owned();

    Ok(Self { speaker, text })
  }
}

// ─── Unit ────────────────────────────────────────────────────────────────────

/// One transcript raw unit: a whole session file.
#[derive(Debug, Clone)]
pub struct TranscriptUnit {
  /// The unit's identity for logging — the filename stem.
  pub unit_id:          String,
  pub identity:         SessionIdentity,
  pub date:             Option<NaiveDate>,
  pub source_reference: String,
  pub topics:           Vec<RawTopic>,
}

impl TranscriptUnit {
  /// The candidate session row for this unit.
  pub fn session(&self) -> Session {
    Session {
      session_id:       self.identity.session_id(),
      date:             self.date,
      chamber:          self.identity.chamber,
      legislature:      self.identity.legislature,
      session_number:   self.identity.session_number,
      source_reference: Some(self.source_reference.clone()),
    }
  }
}

/// Read one transcript file. `chamber` comes from per-run configuration
/// since the filename stem does not encode it.
pub fn read_transcript_unit(path: &Path, chamber: Chamber) -> Result<TranscriptUnit> {
  let stem = path
    .file_stem()
    .and_then(|s| s.to_str())
    .ok_or_else(|| Error::BadUnitName(path.display().to_string()))?
    .to_owned();
  let (legislature, session_number) = parse_unit_stem(&stem)?;

  let body = std::fs::read_to_string(path).map_err(|source| Error::Io {
    path: path.display().to_string(),
    source,
  })?;

  let raw: RawTranscript =
    serde_json::from_str(&body).map_err(|source| Error::Json {
      path: path.display().to_string(),
      source,
    })?;

  let topics = raw
    .contents
    .into_iter()
    .map(|(title, interventions)| RawTopic {
      title,
      interventions: match interventions {
        Value::Array(items) => items,
        // A non-array intervention list is one malformed record under
        // its topic, not a dead unit.
        other => vec![other],
      },
    })
    .collect();

  Ok(TranscriptUnit {
    unit_id: stem,
    identity: SessionIdentity {
      legislature,
      chamber,
      session_number,
    },
    date: parse_date_soft(raw.date.as_deref()),
    source_reference: path.display().to_string(),
    topics,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn unit_stem_encodes_session_identity() {
    assert_eq!(parse_unit_stem("19__347").unwrap(), (19, 347));
    assert!(parse_unit_stem("19-347").is_err());
    assert!(parse_unit_stem("a__b").is_err());
  }

  #[test]
  fn intervention_requires_an_object() {
    let err = Intervention::from_value(&json!("just a string")).unwrap_err();
    assert!(err.is_record_level());

    let ok = Intervention::from_value(&json!({
      "speaker": "ROSSI Mario", "text": "Grazie, Presidente."
    }))
    .unwrap();
    assert_eq!(ok.speaker, "ROSSI Mario");
  }

  #[test]
  fn missing_speaker_defaults_to_unknown() {
    let iv = Intervention::from_value(&json!({ "text": "..." })).unwrap();
    assert_eq!(iv.speaker, "Unknown");
    let iv = Intervention::from_value(&json!({ "speaker": "X" })).unwrap();
    assert_eq!(iv.text, "");
  }
}
