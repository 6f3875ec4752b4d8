//! Deterministic identifiers for canonical entities.
//!
//! Every identifier is derived from source data, never generated randomly,
//! so reprocessing the same raw unit always reproduces the same ids and the
//! skip-on-exists upsert policy makes reruns no-ops.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::entity::Chamber;

/// Prefix marking a synthetically-created person for an unresolved speaker.
pub const PLACEHOLDER_PREFIX: &str = "unresolved_";

fn sha256_hex(input: &str) -> String {
  let digest = Sha256::digest(input.as_bytes());
  hex::encode(digest)
}

// ─── PersonId ────────────────────────────────────────────────────────────────

/// Stable, source-qualified person identifier.
///
/// Profile-sourced ids look like `op_12345`; placeholders for unresolved
/// speakers look like `unresolved_<hash16>` where the hash is derived from
/// the normalized speaker name.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
  /// Qualify a source-native id, e.g. `from_source("op", "12345")`.
  pub fn from_source(source: &str, native_id: &str) -> Self {
    Self(format!("{source}_{native_id}"))
  }

  /// Derive the placeholder id for a speaker name that could not be
  /// resolved. Takes the *normalized* name so the derivation is stable
  /// across raw spellings that normalize identically.
  pub fn placeholder(normalized_name: &str) -> Self {
    let hash = sha256_hex(normalized_name);
    Self(format!("{PLACEHOLDER_PREFIX}{}", &hash[..16]))
  }

  pub fn is_placeholder(&self) -> bool {
    self.0.starts_with(PLACEHOLDER_PREFIX)
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn from_raw(raw: impl Into<String>) -> Self { Self(raw.into()) }
}

impl fmt::Display for PersonId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── SessionId ───────────────────────────────────────────────────────────────

/// Identifier derived from (legislature, chamber, session number).
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
  pub fn new(legislature: u32, chamber: Chamber, session_number: u32) -> Self {
    Self(format!(
      "session_{legislature}_{}_{session_number}",
      chamber.code()
    ))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn from_raw(raw: impl Into<String>) -> Self { Self(raw.into()) }
}

impl fmt::Display for SessionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── TopicId ─────────────────────────────────────────────────────────────────

/// Identifier derived from the owning session plus a hash of the title.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TopicId(String);

impl TopicId {
  pub fn for_title(session_id: &SessionId, title: &str) -> Self {
    let hash = sha256_hex(title);
    Self(format!("{session_id}_topic_{}", &hash[..8]))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn from_raw(raw: impl Into<String>) -> Self { Self(raw.into()) }
}

impl fmt::Display for TopicId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── SpeechId ────────────────────────────────────────────────────────────────

/// Identifier derived from topic + ordinal + normalized speaker name.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SpeechId(String);

impl SpeechId {
  pub fn derive(
    topic_id: &TopicId,
    ordinal: u32,
    normalized_speaker: &str,
  ) -> Self {
    let hash = sha256_hex(&format!("{topic_id}|{ordinal}|{normalized_speaker}"));
    Self(format!("{topic_id}_speech_{}", &hash[..12]))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn from_raw(raw: impl Into<String>) -> Self { Self(raw.into()) }
}

impl fmt::Display for SpeechId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
