//! [`SqliteStore`] — the SQLite implementation of [`CanonicalStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use aula_core::{
  entity::{Person, Session, SpeechSegment, Topic},
  id::{PersonId, SessionId, SpeechId, TopicId, PLACEHOLDER_PREFIX},
  store::CanonicalStore,
};

use crate::{
  encode::{
    encode_chamber, encode_date, encode_roles, encode_source_ids, RawPerson,
    RawSession, RawSpeech, RawTopic,
  },
  schema::SCHEMA,
  Error, Result,
};

const PERSON_COLUMNS: &str = "person_id, full_name, family_name, given_name, \
                              party, roles, source_ids, birth_date, \
                              birth_place, image_url, slug, raw";

fn person_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPerson> {
  Ok(RawPerson {
    person_id:   row.get(0)?,
    full_name:   row.get(1)?,
    family_name: row.get(2)?,
    given_name:  row.get(3)?,
    party:       row.get(4)?,
    roles:       row.get(5)?,
    source_ids:  row.get(6)?,
    birth_date:  row.get(7)?,
    birth_place: row.get(8)?,
    image_url:   row.get(9)?,
    slug:        row.get(10)?,
    raw:         row.get(11)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The aula canonical store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Row counts per entity table; used by reports and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
  pub persons:  usize,
  pub sessions: usize,
  pub topics:   usize,
  pub speeches: usize,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_persons_where(&self, where_clause: &str) -> Result<Vec<Person>> {
    let sql = format!(
      "SELECT {PERSON_COLUMNS} FROM persons {where_clause} ORDER BY person_id"
    );

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], person_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  /// Row counts across all four entity tables.
  pub async fn counts(&self) -> Result<StoreCounts> {
    let (persons, sessions, topics, speeches) = self
      .conn
      .call(|conn| {
        let count = |table: &str| -> rusqlite::Result<usize> {
          conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| {
            r.get::<_, i64>(0).map(|n| n as usize)
          })
        };
        Ok((
          count("persons")?,
          count("sessions")?,
          count("topics")?,
          count("speech_segments")?,
        ))
      })
      .await?;

    Ok(StoreCounts {
      persons,
      sessions,
      topics,
      speeches,
    })
  }

  /// All speech segments, ordered by id. For reports and tests; the
  /// pipeline itself never reads speeches back.
  pub async fn list_speeches(&self) -> Result<Vec<SpeechSegment>> {
    let raws: Vec<RawSpeech> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT speech_id, session_id, topic_id, speaker_id, text, date,
                  source_reference, order_in_topic
           FROM speech_segments ORDER BY speech_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawSpeech {
              speech_id:        row.get(0)?,
              session_id:       row.get(1)?,
              topic_id:         row.get(2)?,
              speaker_id:       row.get(3)?,
              text:             row.get(4)?,
              date:             row.get(5)?,
              source_reference: row.get(6)?,
              order_in_topic:   row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSpeech::into_speech).collect()
  }

  /// Speech rows whose `speaker_id` has no matching person row. Always
  /// empty after a committed run — checked by tests.
  pub async fn orphan_speech_count(&self) -> Result<usize> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM speech_segments sp
           LEFT JOIN persons p ON p.person_id = sp.speaker_id
           WHERE p.person_id IS NULL",
          [],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(count as usize)
  }
}

// ─── CanonicalStore impl ─────────────────────────────────────────────────────

impl CanonicalStore for SqliteStore {
  type Error = Error;

  // ── Unit transaction bracket ──────────────────────────────────────────────

  async fn begin_unit(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn commit_unit(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch("COMMIT")?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn rollback_unit(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch("ROLLBACK")?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn get_person(&self, id: &PersonId) -> Result<Option<Person>> {
    let id_str = id.as_str().to_owned();
    let sql = format!("SELECT {PERSON_COLUMNS} FROM persons WHERE person_id = ?1");

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], person_from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn insert_person(&self, person: Person) -> Result<()> {
    let roles_str = encode_roles(&person.roles)?;
    let source_ids_str = encode_source_ids(&person.source_ids)?;
    let birth_date_str = person.birth_date.map(encode_date);
    let raw_str = person
      .raw
      .as_ref()
      .map(serde_json::to_string)
      .transpose()?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO persons (
             person_id, full_name, family_name, given_name, party,
             roles, source_ids, birth_date, birth_place, image_url, slug, raw
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            person.person_id.as_str(),
            person.full_name,
            person.family_name,
            person.given_name,
            person.party,
            roles_str,
            source_ids_str,
            birth_date_str,
            person.birth_place,
            person.image_url,
            person.slug,
            raw_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn update_person(&self, person: Person) -> Result<()> {
    let source_ids_str = encode_source_ids(&person.source_ids)?;
    let birth_date_str = person.birth_date.map(encode_date);
    let raw_str = person
      .raw
      .as_ref()
      .map(serde_json::to_string)
      .transpose()?;

    // `roles` is deliberately absent from the SET list: roles are frozen
    // at creation.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE persons SET
             full_name = ?2, family_name = ?3, given_name = ?4, party = ?5,
             source_ids = ?6, birth_date = ?7, birth_place = ?8,
             image_url = ?9, slug = ?10, raw = ?11
           WHERE person_id = ?1",
          rusqlite::params![
            person.person_id.as_str(),
            person.full_name,
            person.family_name,
            person.given_name,
            person.party,
            source_ids_str,
            birth_date_str,
            person.birth_place,
            person.image_url,
            person.slug,
            raw_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn person_roster(&self) -> Result<Vec<Person>> {
    self.list_persons_where("").await
  }

  async fn placeholder_persons(&self) -> Result<Vec<Person>> {
    let clause = format!("WHERE person_id LIKE '{PLACEHOLDER_PREFIX}%'");
    self.list_persons_where(&clause).await
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn get_session(&self, id: &SessionId) -> Result<Option<Session>> {
    let id_str = id.as_str().to_owned();

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT session_id, date, chamber, legislature, session_number,
                      source_reference
               FROM sessions WHERE session_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawSession {
                  session_id:       row.get(0)?,
                  date:             row.get(1)?,
                  chamber:          row.get(2)?,
                  legislature:      row.get(3)?,
                  session_number:   row.get(4)?,
                  source_reference: row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn insert_session(&self, session: Session) -> Result<()> {
    let date_str = session.date.map(encode_date);
    let chamber_str = encode_chamber(session.chamber).to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (
             session_id, date, chamber, legislature, session_number,
             source_reference
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            session.session_id.as_str(),
            date_str,
            chamber_str,
            session.legislature,
            session.session_number,
            session.source_reference,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Topics ────────────────────────────────────────────────────────────────

  async fn get_topic(&self, id: &TopicId) -> Result<Option<Topic>> {
    let id_str = id.as_str().to_owned();

    let raw: Option<RawTopic> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT topic_id, session_id, title FROM topics WHERE topic_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawTopic {
                  topic_id:   row.get(0)?,
                  session_id: row.get(1)?,
                  title:      row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawTopic::into_topic))
  }

  async fn insert_topic(&self, topic: Topic) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO topics (topic_id, session_id, title) VALUES (?1, ?2, ?3)",
          rusqlite::params![
            topic.topic_id.as_str(),
            topic.session_id.as_str(),
            topic.title,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Speech segments ───────────────────────────────────────────────────────

  async fn speech_exists(&self, id: &SpeechId) -> Result<bool> {
    let id_str = id.as_str().to_owned();

    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM speech_segments WHERE speech_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(exists)
  }

  async fn insert_speech(&self, speech: SpeechSegment) -> Result<()> {
    let date_str = speech.date.map(encode_date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO speech_segments (
             speech_id, session_id, topic_id, speaker_id, text, date,
             source_reference, order_in_topic
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            speech.speech_id.as_str(),
            speech.session_id.as_str(),
            speech.topic_id.as_str(),
            speech.speaker_id.as_str(),
            speech.text,
            date_str,
            speech.source_reference,
            speech.order_in_topic,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
