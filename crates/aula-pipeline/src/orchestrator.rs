//! The pipeline orchestrator.
//!
//! Drives the end-to-end run in fixed kind order — persons before sessions,
//! sessions before topics, topics before speeches — so referential
//! integrity holds at every commit. Each unit (one profile record, or one
//! transcript file) gets its own transaction: commit on success, roll back
//! on any unit-level error, and continue to the next unit either way. A
//! malformed file never halts the run.
//!
//! Within a transcript unit, record-level validation failures (malformed
//! intervention, empty title, empty speech text) are skipped individually
//! and counted; they are a different severity class from unit-level errors
//! and never trigger rollback of the unit's already-processed records.

use std::path::{Path, PathBuf};

use aula_core::{
  entity::{Chamber, SpeechSegment, Topic},
  id::{SpeechId, TopicId},
  normalize::{normalize_name, normalize_text},
  store::CanonicalStore,
};
use aula_sources::{
  discover_units,
  profile::read_profile_unit,
  transcript::{read_transcript_unit, Intervention},
  unit_name,
};

use crate::{
  error::UnitError,
  merge::{MergeEngine, WriteOutcome},
  report::{RunReport, UnitCounts, UnitOutcome, UnitReport},
  resolver::{Resolution, SpeakerResolver},
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Where the raw units live and how to interpret them. A `None` directory
/// skips that phase.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
  pub profiles_dir:    Option<PathBuf>,
  pub transcripts_dir: Option<PathBuf>,
  /// Chamber for transcript units; the filename stem does not encode it.
  pub chamber:         Chamber,
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Owns the store handle and processes units strictly sequentially.
pub struct Pipeline<S> {
  store:  S,
  config: PipelineConfig,
}

impl<S: CanonicalStore> Pipeline<S> {
  pub fn new(store: S, config: PipelineConfig) -> Self {
    Self { store, config }
  }

  pub fn store(&self) -> &S { &self.store }

  /// Run both phases. Errors only on store failures outside any unit
  /// (loading the roster between phases); everything inside a unit is
  /// isolated to that unit.
  pub async fn run(&self) -> Result<RunReport, UnitError> {
    let mut report = RunReport::default();

    if let Some(dir) = self.config.profiles_dir.clone() {
      for path in self.discover(&dir) {
        report.units.push(self.run_profile_unit(&path).await);
      }
    }

    if let Some(dir) = self.config.transcripts_dir.clone() {
      // Load the roster after the profile phase so resolution sees every
      // known person, including ones committed moments ago.
      let roster = self
        .store
        .person_roster()
        .await
        .map_err(UnitError::store)?;
      let mut resolver = SpeakerResolver::new(roster);

      for path in self.discover(&dir) {
        report
          .units
          .push(self.run_transcript_unit(&mut resolver, &path).await);
      }
    }

    let totals = report.totals();
    tracing::info!(
      units = report.units.len(),
      committed = report.committed(),
      rolled_back = report.rolled_back(),
      created = totals.created,
      updated = totals.updated,
      skipped = totals.skipped,
      placeholders = totals.placeholders,
      "pipeline run finished"
    );
    Ok(report)
  }

  fn discover(&self, dir: &Path) -> Vec<PathBuf> {
    match discover_units(dir) {
      Ok(units) => units,
      Err(err) => {
        tracing::warn!(dir = %dir.display(), error = %err, "source directory not readable; phase skipped");
        Vec::new()
      }
    }
  }

  // ── Unit drivers ──────────────────────────────────────────────────────────

  async fn run_profile_unit(&self, path: &Path) -> UnitReport {
    let unit_id = unit_name(path);

    if let Err(err) = self.store.begin_unit().await {
      return rolled_back(unit_id, &UnitError::store(err));
    }
    let worked = self.process_profile_unit(path).await;
    self.seal_unit(unit_id, worked).await
  }

  async fn run_transcript_unit(
    &self,
    resolver: &mut SpeakerResolver,
    path: &Path,
  ) -> UnitReport {
    let unit_id = unit_name(path);

    if let Err(err) = self.store.begin_unit().await {
      return rolled_back(unit_id, &UnitError::store(err));
    }
    let worked = self.process_transcript_unit(resolver, path).await;
    self.seal_unit(unit_id, worked).await
  }

  /// Terminal transition of the unit state machine: commit the unit's
  /// transaction on success, roll it back otherwise, and emit the one
  /// structured event per unit either way.
  async fn seal_unit(
    &self,
    unit_id: String,
    worked: Result<UnitCounts, UnitError>,
  ) -> UnitReport {
    let err = match worked {
      Ok(counts) => match self.store.commit_unit().await {
        Ok(()) => {
          tracing::info!(
            unit = %unit_id,
            outcome = "committed",
            created = counts.created,
            updated = counts.updated,
            skipped = counts.skipped,
            placeholders = counts.placeholders,
            "unit committed"
          );
          return UnitReport {
            unit_id,
            outcome: UnitOutcome::Committed,
            counts,
          };
        }
        Err(commit_err) => UnitError::store(commit_err),
      },
      Err(err) => err,
    };

    if let Err(rollback_err) = self.store.rollback_unit().await {
      tracing::error!(unit = %unit_id, error = %rollback_err, "rollback failed");
    }
    rolled_back(unit_id, &err)
  }

  // ── Profile units ─────────────────────────────────────────────────────────

  async fn process_profile_unit(
    &self,
    path: &Path,
  ) -> Result<UnitCounts, UnitError> {
    let engine = MergeEngine::new(&self.store);
    let mut counts = UnitCounts::default();

    match read_profile_unit(path) {
      Ok(unit) => {
        let outcome = engine
          .upsert_person(unit.person)
          .await
          .map_err(UnitError::store)?;
        counts.absorb(outcome);
      }
      Err(err) if err.is_record_level() => {
        // The unit's single record failed validation: skip it, commit
        // the (empty) unit.
        tracing::debug!(unit = %unit_name(path), error = %err, "profile record skipped");
        counts.skipped += 1;
      }
      Err(err) => return Err(err.into()),
    }

    Ok(counts)
  }

  // ── Transcript units ──────────────────────────────────────────────────────

  async fn process_transcript_unit(
    &self,
    resolver: &mut SpeakerResolver,
    path: &Path,
  ) -> Result<UnitCounts, UnitError> {
    let unit = read_transcript_unit(path, self.config.chamber)?;
    let engine = MergeEngine::new(&self.store);
    let mut counts = UnitCounts::default();

    let session = unit.session();
    let session_id = session.session_id.clone();
    let session_date = session.date;
    counts.absorb(
      engine
        .upsert_session(session)
        .await
        .map_err(UnitError::store)?,
    );

    for raw_topic in &unit.topics {
      let title = normalize_text(&raw_topic.title);
      if title.is_empty() || raw_topic.interventions.is_empty() {
        // Contributes zero Topic/SpeechSegment rows, no rollback.
        counts.skipped += 1;
        continue;
      }

      let topic_id = TopicId::for_title(&session_id, &title);
      counts.absorb(
        engine
          .upsert_topic(Topic {
            topic_id:   topic_id.clone(),
            session_id: session_id.clone(),
            title,
          })
          .await
          .map_err(UnitError::store)?,
      );

      for (ordinal, value) in raw_topic.interventions.iter().enumerate() {
        let intervention = match Intervention::from_value(value) {
          Ok(intervention) => intervention,
          Err(err) => {
            tracing::debug!(unit = %unit.unit_id, ordinal, error = %err, "intervention skipped");
            counts.skipped += 1;
            continue;
          }
        };

        let text = normalize_text(&intervention.text);
        if text.is_empty() {
          counts.skipped += 1;
          continue;
        }

        let speaker_norm = normalize_name(&intervention.speaker);
        let speaker_id = match resolver.resolve(&intervention.speaker) {
          Resolution::Matched { person_id, .. } => person_id,
          Resolution::Placeholder { person } => {
            let person_id = person.person_id.clone();
            let outcome = engine
              .upsert_person(person)
              .await
              .map_err(UnitError::store)?;
            counts.absorb(outcome);
            if outcome == WriteOutcome::Created {
              counts.placeholders += 1;
              tracing::warn!(
                speaker = %intervention.speaker,
                placeholder = %person_id,
                "unresolved speaker"
              );
            }
            person_id
          }
        };

        let speech_id = SpeechId::derive(&topic_id, ordinal as u32, &speaker_norm);
        counts.absorb(
          engine
            .upsert_speech(SpeechSegment {
              speech_id,
              session_id: session_id.clone(),
              topic_id: topic_id.clone(),
              speaker_id,
              text,
              date: session_date,
              source_reference: Some(unit.source_reference.clone()),
              order_in_topic: ordinal as u32,
            })
            .await
            .map_err(UnitError::store)?,
        );
      }
    }

    Ok(counts)
  }
}

fn rolled_back(unit_id: String, err: &UnitError) -> UnitReport {
  tracing::error!(unit = %unit_id, outcome = "rolled_back", error = %err, "unit rolled back");
  UnitReport {
    unit_id,
    outcome: UnitOutcome::RolledBack,
    counts:  UnitCounts::default(),
  }
}
