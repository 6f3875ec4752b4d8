//! Encoding and decoding helpers between Rust domain types and the plain
//! text representations stored in SQLite columns.
//!
//! Dates are stored as ISO `YYYY-MM-DD` strings. Structured fields (roles,
//! source_ids, raw payload) are stored as compact JSON. Chambers are stored
//! as their single-letter code.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use aula_core::{
  entity::{Chamber, Person, Role, Session, SpeechSegment, Topic},
  id::{PersonId, SessionId, SpeechId, TopicId},
};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Chamber ─────────────────────────────────────────────────────────────────

pub fn encode_chamber(c: Chamber) -> &'static str { c.code() }

pub fn decode_chamber(s: &str) -> Result<Chamber> {
  Ok(Chamber::from_code(s)?)
}

// ─── Roles / source ids ──────────────────────────────────────────────────────

pub fn encode_roles(roles: &[Role]) -> Result<String> {
  Ok(serde_json::to_string(roles)?)
}

pub fn decode_roles(s: &str) -> Result<Vec<Role>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_source_ids(ids: &BTreeMap<String, String>) -> Result<String> {
  Ok(serde_json::to_string(ids)?)
}

pub fn decode_source_ids(s: &str) -> Result<BTreeMap<String, String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `persons` row.
pub struct RawPerson {
  pub person_id:   String,
  pub full_name:   String,
  pub family_name: String,
  pub given_name:  String,
  pub party:       Option<String>,
  pub roles:       String,
  pub source_ids:  String,
  pub birth_date:  Option<String>,
  pub birth_place: Option<String>,
  pub image_url:   Option<String>,
  pub slug:        Option<String>,
  pub raw:         Option<String>,
}

impl RawPerson {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:   PersonId::from_raw(self.person_id),
      full_name:   self.full_name,
      family_name: self.family_name,
      given_name:  self.given_name,
      party:       self.party,
      roles:       decode_roles(&self.roles)?,
      source_ids:  decode_source_ids(&self.source_ids)?,
      birth_date:  self.birth_date.as_deref().map(decode_date).transpose()?,
      birth_place: self.birth_place,
      image_url:   self.image_url,
      slug:        self.slug,
      raw:         self
        .raw
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?,
    })
  }
}

/// Raw strings read directly from a `sessions` row.
pub struct RawSession {
  pub session_id:       String,
  pub date:             Option<String>,
  pub chamber:          String,
  pub legislature:      u32,
  pub session_number:   u32,
  pub source_reference: Option<String>,
}

impl RawSession {
  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      session_id:       SessionId::from_raw(self.session_id),
      date:             self.date.as_deref().map(decode_date).transpose()?,
      chamber:          decode_chamber(&self.chamber)?,
      legislature:      self.legislature,
      session_number:   self.session_number,
      source_reference: self.source_reference,
    })
  }
}

/// Raw strings read directly from a `topics` row.
pub struct RawTopic {
  pub topic_id:   String,
  pub session_id: String,
  pub title:      String,
}

impl RawTopic {
  pub fn into_topic(self) -> Topic {
    Topic {
      topic_id:   TopicId::from_raw(self.topic_id),
      session_id: SessionId::from_raw(self.session_id),
      title:      self.title,
    }
  }
}

/// Raw strings read directly from a `speech_segments` row.
pub struct RawSpeech {
  pub speech_id:        String,
  pub session_id:       String,
  pub topic_id:         String,
  pub speaker_id:       String,
  pub text:             String,
  pub date:             Option<String>,
  pub source_reference: Option<String>,
  pub order_in_topic:   u32,
}

impl RawSpeech {
  pub fn into_speech(self) -> Result<SpeechSegment> {
    Ok(SpeechSegment {
      speech_id:        SpeechId::from_raw(self.speech_id),
      session_id:       SessionId::from_raw(self.session_id),
      topic_id:         TopicId::from_raw(self.topic_id),
      speaker_id:       PersonId::from_raw(self.speaker_id),
      text:             self.text,
      date:             self.date.as_deref().map(decode_date).transpose()?,
      source_reference: self.source_reference,
      order_in_topic:   self.order_in_topic,
    })
  }
}
