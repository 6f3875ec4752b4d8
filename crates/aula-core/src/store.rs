//! The `CanonicalStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `aula-store-sqlite`).
//! The pipeline depends on this abstraction, not on any concrete backend,
//! and owns the store handle exclusively — no component holds ambient
//! global state.
//!
//! Writes happen inside a per-unit transaction bracket: `begin_unit`, then
//! any number of lookups and inserts, then exactly one of `commit_unit` or
//! `rollback_unit`. Implementations may assume brackets never nest (the
//! orchestrator processes units strictly sequentially).

use std::future::Future;

use crate::{
  entity::{Person, Session, SpeechSegment, Topic},
  id::{PersonId, SessionId, SpeechId, TopicId},
};

/// Abstraction over the canonical store backend.
///
/// All methods return `Send` futures so the trait can be used from a tokio
/// runtime. Merge policy (create vs. update vs. skip) lives above this
/// trait; implementations only provide raw lookups, inserts, one person
/// update, and the transaction bracket.
pub trait CanonicalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Unit transaction bracket ──────────────────────────────────────────

  fn begin_unit(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn commit_unit(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn rollback_unit(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Persons ───────────────────────────────────────────────────────────

  fn get_person<'a>(
    &'a self,
    id: &'a PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  fn insert_person(
    &self,
    person: Person,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Rewrite a person's mutable columns. Implementations must leave
  /// `roles` untouched — roles are frozen at creation.
  fn update_person(
    &self,
    person: Person,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All known persons, ordered by id. Feeds the speaker resolver's
  /// roster cache.
  fn person_roster(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Placeholder persons only, ordered by id. Feeds the unmatched-speaker
  /// report.
  fn placeholder_persons(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  fn get_session<'a>(
    &'a self,
    id: &'a SessionId,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + 'a;

  fn insert_session(
    &self,
    session: Session,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Topics ────────────────────────────────────────────────────────────

  fn get_topic<'a>(
    &'a self,
    id: &'a TopicId,
  ) -> impl Future<Output = Result<Option<Topic>, Self::Error>> + Send + 'a;

  fn insert_topic(
    &self,
    topic: Topic,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Speech segments ───────────────────────────────────────────────────

  fn speech_exists<'a>(
    &'a self,
    id: &'a SpeechId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn insert_speech(
    &self,
    speech: SpeechSegment,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
