//! Merge/upsert policy, per entity kind.
//!
//! Person records accrete metadata over repeated fetches, so they merge.
//! Transcript-derived records (sessions, topics, speeches) are write-once
//! facts from an immutable document: re-processing a file must never
//! fabricate a different version of history, so they skip on existing ids.

use aula_core::{
  entity::{Person, Session, SpeechSegment, Topic},
  store::CanonicalStore,
};

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
  Created,
  Updated,
  Skipped,
}

/// Applies the per-kind merge policy through a [`CanonicalStore`].
pub struct MergeEngine<'s, S> {
  store: &'s S,
}

impl<'s, S: CanonicalStore> MergeEngine<'s, S> {
  pub fn new(store: &'s S) -> Self { Self { store } }

  /// Create the person, or merge into the existing row: `party`,
  /// `source_ids` and the raw payload update on every upsert; name fields
  /// fill only when the stored value is empty; `roles` are frozen.
  pub async fn upsert_person(
    &self,
    candidate: Person,
  ) -> Result<WriteOutcome, S::Error> {
    match self.store.get_person(&candidate.person_id).await? {
      None => {
        self.store.insert_person(candidate).await?;
        Ok(WriteOutcome::Created)
      }
      Some(existing) => {
        self.store.update_person(merge_person(existing, candidate)).await?;
        Ok(WriteOutcome::Updated)
      }
    }
  }

  pub async fn upsert_session(
    &self,
    candidate: Session,
  ) -> Result<WriteOutcome, S::Error> {
    if self.store.get_session(&candidate.session_id).await?.is_some() {
      return Ok(WriteOutcome::Skipped);
    }
    self.store.insert_session(candidate).await?;
    Ok(WriteOutcome::Created)
  }

  pub async fn upsert_topic(
    &self,
    candidate: Topic,
  ) -> Result<WriteOutcome, S::Error> {
    if self.store.get_topic(&candidate.topic_id).await?.is_some() {
      return Ok(WriteOutcome::Skipped);
    }
    self.store.insert_topic(candidate).await?;
    Ok(WriteOutcome::Created)
  }

  /// The caller guarantees the speaker's person row exists before this is
  /// called (placeholder upsert happens-before the speech write).
  pub async fn upsert_speech(
    &self,
    candidate: SpeechSegment,
  ) -> Result<WriteOutcome, S::Error> {
    if self.store.speech_exists(&candidate.speech_id).await? {
      return Ok(WriteOutcome::Skipped);
    }
    self.store.insert_speech(candidate).await?;
    Ok(WriteOutcome::Created)
  }
}

/// The person merge policy, as a pure function over the two rows.
fn merge_person(existing: Person, incoming: Person) -> Person {
  fn fill(current: String, incoming: String) -> String {
    if current.is_empty() { incoming } else { current }
  }

  let mut source_ids = existing.source_ids;
  source_ids.extend(incoming.source_ids);

  Person {
    person_id:   existing.person_id,
    full_name:   fill(existing.full_name, incoming.full_name),
    family_name: fill(existing.family_name, incoming.family_name),
    given_name:  fill(existing.given_name, incoming.given_name),
    party:       incoming.party.or(existing.party),
    roles:       existing.roles,
    source_ids,
    birth_date:  existing.birth_date.or(incoming.birth_date),
    birth_place: existing.birth_place.or(incoming.birth_place),
    image_url:   existing.image_url.or(incoming.image_url),
    slug:        existing.slug.or(incoming.slug),
    raw:         incoming.raw.or(existing.raw),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use aula_core::{entity::Role, id::PersonId};

  fn named(full: &str, family: &str, given: &str) -> Person {
    let mut p = Person::empty(PersonId::from_raw("op_1"));
    p.full_name = full.to_owned();
    p.family_name = family.to_owned();
    p.given_name = given.to_owned();
    p
  }

  #[test]
  fn names_fill_only_when_empty() {
    let existing = named("Rossi Mario", "Rossi", "Mario");
    let mut incoming = named("ROSSI M.", "", "Massimo");
    incoming.party = Some("XY".to_owned());

    let merged = merge_person(existing, incoming);
    assert_eq!(merged.full_name, "Rossi Mario");
    assert_eq!(merged.given_name, "Mario");
    assert_eq!(merged.party.as_deref(), Some("XY"));
  }

  #[test]
  fn empty_names_accept_incoming() {
    let existing = named("", "", "");
    let incoming = named("Rossi Mario", "Rossi", "Mario");

    let merged = merge_person(existing, incoming);
    assert_eq!(merged.full_name, "Rossi Mario");
    assert_eq!(merged.family_name, "Rossi");
  }

  #[test]
  fn missing_incoming_party_keeps_existing() {
    let mut existing = named("Rossi Mario", "Rossi", "Mario");
    existing.party = Some("XY".to_owned());
    let incoming = named("Rossi Mario", "Rossi", "Mario");

    let merged = merge_person(existing, incoming);
    assert_eq!(merged.party.as_deref(), Some("XY"));
  }

  #[test]
  fn roles_are_frozen_and_source_ids_merge() {
    let mut existing = named("Rossi Mario", "Rossi", "Mario");
    existing.roles = vec![Role {
      role:       "deputato".to_owned(),
      start_date: None,
      end_date:   None,
      party:      None,
    }];
    existing
      .source_ids
      .insert("openparlamento".to_owned(), "p1".to_owned());

    let mut incoming = named("Rossi Mario", "Rossi", "Mario");
    incoming.roles = vec![];
    incoming.source_ids.insert("slug".to_owned(), "rossi".to_owned());
    incoming.raw = Some(serde_json::json!({ "id": 1 }));

    let merged = merge_person(existing, incoming);
    assert_eq!(merged.roles.len(), 1);
    assert_eq!(merged.source_ids.len(), 2);
    assert!(merged.raw.is_some());
  }
}
