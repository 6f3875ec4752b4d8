//! Canonical entities — the normalized, deduplicated records held by the
//! canonical store.
//!
//! All four entities are created or merged exclusively by pipeline runs and
//! never deleted automatically. Placeholder persons persist until a human
//! re-links their speeches.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  error::Error,
  id::{PersonId, SessionId, SpeechId, TopicId},
};

// ─── Chamber ─────────────────────────────────────────────────────────────────

/// The chamber a session belongs to. A closed two-value set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chamber {
  Camera,
  Senato,
}

impl Chamber {
  /// The single-letter code used in identifiers and storage.
  pub fn code(self) -> &'static str {
    match self {
      Chamber::Camera => "C",
      Chamber::Senato => "S",
    }
  }

  pub fn from_code(code: &str) -> Result<Self, Error> {
    match code {
      "C" => Ok(Chamber::Camera),
      "S" => Ok(Chamber::Senato),
      other => Err(Error::UnknownChamber(other.to_owned())),
    }
  }
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// One role a person has held, as reported by the profile source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
  pub role:       String,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
  pub party:      Option<String>,
}

/// A politician, either sourced from a profile feed or synthesized as a
/// placeholder for an unresolved transcript speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
  pub person_id:   PersonId,
  pub full_name:   String,
  pub family_name: String,
  pub given_name:  String,
  pub party:       Option<String>,
  /// Role descriptors, in source order. Frozen after creation.
  pub roles:       Vec<Role>,
  /// Source name → native id in that source.
  pub source_ids:  BTreeMap<String, String>,
  pub birth_date:  Option<NaiveDate>,
  pub birth_place: Option<String>,
  pub image_url:   Option<String>,
  pub slug:        Option<String>,
  /// Full raw payload from the profile source, kept for re-processing.
  pub raw:         Option<serde_json::Value>,
}

impl Person {
  /// A minimal person with empty attributes, used as the base for
  /// placeholder synthesis.
  pub fn empty(person_id: PersonId) -> Self {
    Self {
      person_id,
      full_name: String::new(),
      family_name: String::new(),
      given_name: String::new(),
      party: None,
      roles: Vec::new(),
      source_ids: BTreeMap::new(),
      birth_date: None,
      birth_place: None,
      image_url: None,
      slug: None,
      raw: None,
    }
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// A parliamentary session, unique per (legislature, chamber, number).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  pub session_id:       SessionId,
  /// `None` is the unknown-date sentinel; never fabricated.
  pub date:             Option<NaiveDate>,
  pub chamber:          Chamber,
  pub legislature:      u32,
  pub session_number:   u32,
  /// Path or URL of the raw unit this session was read from.
  pub source_reference: Option<String>,
}

// ─── Topic ───────────────────────────────────────────────────────────────────

/// A discussion topic within a session. The owning session row is always
/// written first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
  pub topic_id:   TopicId,
  pub session_id: SessionId,
  pub title:      String,
}

// ─── SpeechSegment ───────────────────────────────────────────────────────────

/// One intervention in a topic. `speaker_id` always references an existing
/// person row (possibly a placeholder) and `text` is non-empty after
/// normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechSegment {
  pub speech_id:        SpeechId,
  pub session_id:       SessionId,
  pub topic_id:         TopicId,
  pub speaker_id:       PersonId,
  pub text:             String,
  pub date:             Option<NaiveDate>,
  pub source_reference: Option<String>,
  /// Ordinal of the intervention within its topic, as read from the unit.
  pub order_in_topic:   u32,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn chamber_codes_round_trip() {
    assert_eq!(Chamber::from_code("C").unwrap(), Chamber::Camera);
    assert_eq!(Chamber::from_code("S").unwrap(), Chamber::Senato);
    assert!(Chamber::from_code("X").is_err());
  }
}
