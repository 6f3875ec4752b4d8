//! Resolver cascade tests and end-to-end pipeline tests against an
//! in-memory store with on-disk raw-unit fixtures.

use std::{fs, path::Path};

use aula_core::{
  entity::{Chamber, Person},
  id::PersonId,
  store::CanonicalStore,
};
use aula_store_sqlite::SqliteStore;
use serde_json::json;
use tempfile::TempDir;

use crate::{
  resolver::{MatchRule, Resolution, SpeakerResolver},
  Pipeline, PipelineConfig, UnitOutcome,
};

// ─── Resolver cascade ────────────────────────────────────────────────────────

fn known(id: &str, family: &str, given: &str) -> Person {
  let mut p = Person::empty(PersonId::from_raw(format!("op_{id}")));
  p.family_name = family.to_owned();
  p.given_name = given.to_owned();
  p.full_name = format!("{family} {given}");
  p
}

/// A roster entry carrying only a display name, as placeholder rows do.
fn known_full_only(id: &str, full: &str) -> Person {
  let mut p = Person::empty(PersonId::from_raw(format!("op_{id}")));
  p.full_name = full.to_owned();
  p
}

fn assert_matched(resolution: Resolution, id: &str, rule: MatchRule) {
  match resolution {
    Resolution::Matched { person_id, rule: got } => {
      assert_eq!(person_id.as_str(), id);
      assert_eq!(got, rule);
    }
    other => panic!("expected match, got {other:?}"),
  }
}

#[test]
fn exact_match_after_normalization() {
  let mut r = SpeakerResolver::new(vec![known("1", "Rossi", "Mario")]);
  assert_matched(r.resolve("rossi  mario"), "op_1", MatchRule::Exact);
  assert_matched(r.resolve("On. Rossi, Mario"), "op_1", MatchRule::Exact);
}

#[test]
fn reverse_token_order_matches() {
  let mut r = SpeakerResolver::new(vec![known_full_only("1", "Mario Rossi")]);
  assert_matched(r.resolve("ROSSI Mario"), "op_1", MatchRule::ReversedTokens);
}

#[test]
fn title_stripping_plus_structural_match() {
  // The property from the matching design: "PRESIDENTE LI Silvana
  // Andreina" must resolve against "SILVANA ANDREINA LI".
  let mut r =
    SpeakerResolver::new(vec![known_full_only("1", "Silvana Andreina Li")]);
  assert_matched(
    r.resolve("PRESIDENTE LI Silvana Andreina"),
    "op_1",
    MatchRule::SurnameFirst,
  );
}

#[test]
fn surname_plus_first_given_loosens() {
  let mut r = SpeakerResolver::new(vec![known("1", "Bianchi", "Anna Maria")]);
  assert_matched(r.resolve("Anna Bianchi"), "op_1", MatchRule::SurnameGiven);
}

#[test]
fn surname_only_accepts_a_unique_candidate() {
  let roster = vec![known("1", "Verdi", "Luigi"), known("2", "Rossi", "Mario")];
  let mut r = SpeakerResolver::new(roster);
  assert_matched(r.resolve("VERDI"), "op_1", MatchRule::SurnameOnly);
}

#[test]
fn surname_only_refuses_to_guess_between_namesakes() {
  let roster = vec![known("1", "Rossi", "Mario"), known("2", "Rossi", "Paola")];
  let mut r = SpeakerResolver::new(roster);

  match r.resolve("ROSSI") {
    Resolution::Placeholder { person } => {
      assert!(person.person_id.is_placeholder());
    }
    other => panic!("expected placeholder, got {other:?}"),
  }

  // A full name still matches a namesake exactly.
  assert_matched(r.resolve("Rossi Paola"), "op_2", MatchRule::Exact);
}

#[test]
fn placeholders_are_stable_within_a_run() {
  let mut r = SpeakerResolver::new(vec![]);

  let first = r.resolve("SCONOSCIUTO Tizio");
  let second = r.resolve("sconosciuto tizio");
  let (a, b) = match (first, second) {
    (
      Resolution::Placeholder { person: a },
      Resolution::Placeholder { person: b },
    ) => (a, b),
    other => panic!("expected placeholders, got {other:?}"),
  };
  assert_eq!(a.person_id, b.person_id);
  assert_eq!(a.family_name, "Tizio");
  assert_eq!(a.given_name, "SCONOSCIUTO");
  assert_eq!(a.full_name, "SCONOSCIUTO Tizio");
}

#[test]
fn degenerate_names_still_resolve_to_something() {
  let mut r = SpeakerResolver::new(vec![known("1", "Rossi", "Mario")]);
  for raw in ["", "   ", "???", "Onorevole"] {
    match r.resolve(raw) {
      Resolution::Placeholder { person } => {
        assert!(person.person_id.is_placeholder());
      }
      other => panic!("expected placeholder for {raw:?}, got {other:?}"),
    }
  }
}

// ─── End-to-end fixtures ─────────────────────────────────────────────────────

fn write_json(dir: &Path, name: &str, value: serde_json::Value) {
  fs::write(dir.join(name), serde_json::to_string(&value).unwrap()).unwrap();
}

fn profile_fixtures(dir: &Path) {
  write_json(
    dir,
    "10.json",
    json!({
      "id": 10,
      "family_name": "Li",
      "given_name": "Silvana Andreina",
      "current_roles": {
        "parl": {
          "role": "deputato",
          "start_date": "2022-10-13",
          "latest_group": { "acronym": "XY", "name": "Gruppo XY" }
        }
      }
    }),
  );
  write_json(
    dir,
    "11.json",
    json!({ "id": 11, "family_name": "Rossi", "given_name": "Mario" }),
  );
  // No native id: the unit commits with its one record skipped.
  write_json(dir, "99.json", json!({ "family_name": "Anonimo" }));
}

fn transcript_fixture(dir: &Path) {
  write_json(
    dir,
    "19__347.json",
    json!({
      "date": "2024-03-12",
      "contents": {
        "Dibattito su X": [
          { "speaker": "PRESIDENTE LI Silvana Andreina", "text": "Apro la seduta." },
          { "speaker": "SCONOSCIUTO Tizio", "text": "Intervengo." },
          { "speaker": "ROSSI Mario", "text": "   " }
        ],
        "Punto vuoto": [],
        "Question time": [
          { "speaker": "ROSSI Mario", "text": "Prima." },
          "non structured",
          { "speaker": "ROSSI Mario", "text": "Terza." }
        ]
      }
    }),
  );
}

async fn pipeline_over(
  profiles: Option<&Path>,
  transcripts: Option<&Path>,
) -> (Pipeline<SqliteStore>, SqliteStore) {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  let pipeline = Pipeline::new(
    store.clone(),
    PipelineConfig {
      profiles_dir:    profiles.map(Path::to_path_buf),
      transcripts_dir: transcripts.map(Path::to_path_buf),
      chamber:         Chamber::Camera,
    },
  );
  (pipeline, store)
}

// ─── End-to-end runs ─────────────────────────────────────────────────────────

#[tokio::test]
async fn full_run_commits_all_units() {
  let profiles = TempDir::new().unwrap();
  let transcripts = TempDir::new().unwrap();
  profile_fixtures(profiles.path());
  transcript_fixture(transcripts.path());

  let (pipeline, store) =
    pipeline_over(Some(profiles.path()), Some(transcripts.path())).await;
  let report = pipeline.run().await.unwrap();

  // 3 profile units + 1 transcript unit, all committed — the malformed
  // profile record and the malformed intervention are skips, not failures.
  assert_eq!(report.units.len(), 4);
  assert_eq!(report.committed(), 4);

  let counts = store.counts().await.unwrap();
  assert_eq!(counts.persons, 3); // two known + one placeholder
  assert_eq!(counts.sessions, 1);
  assert_eq!(counts.topics, 2); // the empty topic contributes no row
  assert_eq!(counts.speeches, 4);
  assert_eq!(store.orphan_speech_count().await.unwrap(), 0);

  let totals = report.totals();
  assert_eq!(totals.placeholders, 1);
  // Skips: malformed profile record, empty topic, malformed intervention,
  // whitespace-only speech text.
  assert_eq!(totals.skipped, 4);

  let placeholders = store.placeholder_persons().await.unwrap();
  assert_eq!(placeholders.len(), 1);
  assert_eq!(placeholders[0].full_name, "SCONOSCIUTO Tizio");
}

#[tokio::test]
async fn partial_unit_commits_around_malformed_records() {
  let transcripts = TempDir::new().unwrap();
  transcript_fixture(transcripts.path());

  let (pipeline, store) = pipeline_over(None, Some(transcripts.path())).await;
  pipeline.run().await.unwrap();

  // Records before and after the malformed intervention both committed.
  let texts: Vec<String> = store
    .list_speeches()
    .await
    .unwrap()
    .into_iter()
    .map(|s| s.text)
    .collect();
  assert!(texts.contains(&"Prima.".to_owned()));
  assert!(texts.contains(&"Terza.".to_owned()));
  assert!(texts.contains(&"Apro la seduta.".to_owned()));
}

#[tokio::test]
async fn speakers_resolve_against_the_profile_phase() {
  let profiles = TempDir::new().unwrap();
  let transcripts = TempDir::new().unwrap();
  profile_fixtures(profiles.path());
  transcript_fixture(transcripts.path());

  let (pipeline, store) =
    pipeline_over(Some(profiles.path()), Some(transcripts.path())).await;
  pipeline.run().await.unwrap();

  let speeches = store.list_speeches().await.unwrap();
  let opener = speeches
    .iter()
    .find(|s| s.text == "Apro la seduta.")
    .unwrap();
  assert_eq!(opener.speaker_id.as_str(), "op_10");
  assert_eq!(
    opener.date,
    chrono::NaiveDate::from_ymd_opt(2024, 3, 12)
  );

  let unknown = speeches.iter().find(|s| s.text == "Intervengo.").unwrap();
  assert!(unknown.speaker_id.is_placeholder());
}

#[tokio::test]
async fn second_run_is_a_no_op() {
  let profiles = TempDir::new().unwrap();
  let transcripts = TempDir::new().unwrap();
  profile_fixtures(profiles.path());
  transcript_fixture(transcripts.path());

  let (pipeline, store) =
    pipeline_over(Some(profiles.path()), Some(transcripts.path())).await;
  pipeline.run().await.unwrap();
  let before = store.counts().await.unwrap();

  let report = pipeline.run().await.unwrap();
  assert_eq!(store.counts().await.unwrap(), before);

  let totals = report.totals();
  assert_eq!(totals.created, 0);
  assert_eq!(totals.placeholders, 0);
}

#[tokio::test]
async fn broken_units_roll_back_without_halting_the_run() {
  let transcripts = TempDir::new().unwrap();
  write_json(
    transcripts.path(),
    "19__1.json",
    json!({
      "contents": {
        "Unico punto": [{ "speaker": "Qualcuno", "text": "Parlo." }]
      }
    }),
  );
  fs::write(transcripts.path().join("19__2.json"), "{ not json").unwrap();
  write_json(transcripts.path(), "badname.json", json!({ "contents": {} }));

  let (pipeline, store) = pipeline_over(None, Some(transcripts.path())).await;
  let report = pipeline.run().await.unwrap();

  let outcome = |name: &str| {
    report
      .units
      .iter()
      .find(|u| u.unit_id == name)
      .map(|u| u.outcome)
      .unwrap()
  };
  assert_eq!(outcome("19__1.json"), UnitOutcome::Committed);
  assert_eq!(outcome("19__2.json"), UnitOutcome::RolledBack);
  assert_eq!(outcome("badname.json"), UnitOutcome::RolledBack);
  assert_eq!(report.rolled_back(), 2);

  let counts = store.counts().await.unwrap();
  assert_eq!(counts.sessions, 1);
  assert_eq!(counts.speeches, 1);
}

#[tokio::test]
async fn profile_rerun_updates_party_but_not_names() {
  let profiles = TempDir::new().unwrap();
  write_json(
    profiles.path(),
    "11.json",
    json!({ "id": 11, "family_name": "Rossi", "given_name": "Mario" }),
  );

  let (pipeline, store) = pipeline_over(Some(profiles.path()), None).await;
  pipeline.run().await.unwrap();

  // The source now reports a different spelling and a party.
  write_json(
    profiles.path(),
    "11.json",
    json!({
      "id": 11,
      "family_name": "ROSSI M.",
      "given_name": "Mario",
      "current_roles": {
        "parl": { "latest_group": { "acronym": "XY" } }
      }
    }),
  );
  pipeline.run().await.unwrap();

  let person = store
    .get_person(&PersonId::from_raw("op_11"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(person.family_name, "Rossi");
  assert_eq!(person.full_name, "Rossi Mario");
  assert_eq!(person.party.as_deref(), Some("XY"));
}
