//! SQL schema for the aula SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS persons (
    person_id    TEXT PRIMARY KEY,
    full_name    TEXT NOT NULL DEFAULT '',
    family_name  TEXT NOT NULL DEFAULT '',
    given_name   TEXT NOT NULL DEFAULT '',
    party        TEXT,
    roles        TEXT NOT NULL DEFAULT '[]',  -- JSON array of role descriptors
    source_ids   TEXT NOT NULL DEFAULT '{}',  -- JSON map: source name -> native id
    birth_date   TEXT,                        -- ISO date or NULL
    birth_place  TEXT,
    image_url    TEXT,
    slug         TEXT,
    raw          TEXT                         -- full source JSON payload
);

CREATE TABLE IF NOT EXISTS sessions (
    session_id       TEXT PRIMARY KEY,
    date             TEXT,                    -- ISO date; NULL = unknown
    chamber          TEXT NOT NULL,           -- 'C' | 'S'
    legislature      INTEGER NOT NULL,
    session_number   INTEGER NOT NULL,
    source_reference TEXT,
    UNIQUE (legislature, chamber, session_number)
);

CREATE TABLE IF NOT EXISTS topics (
    topic_id   TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES sessions(session_id),
    title      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS speech_segments (
    speech_id        TEXT PRIMARY KEY,
    session_id       TEXT NOT NULL REFERENCES sessions(session_id),
    topic_id         TEXT NOT NULL REFERENCES topics(topic_id),
    speaker_id       TEXT NOT NULL REFERENCES persons(person_id),
    text             TEXT NOT NULL,
    date             TEXT,
    source_reference TEXT,
    order_in_topic   INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS persons_family_idx   ON persons(family_name);
CREATE INDEX IF NOT EXISTS topics_session_idx   ON topics(session_id);
CREATE INDEX IF NOT EXISTS speeches_session_idx ON speech_segments(session_id);
CREATE INDEX IF NOT EXISTS speeches_topic_idx   ON speech_segments(topic_id);
CREATE INDEX IF NOT EXISTS speeches_speaker_idx ON speech_segments(speaker_id);

PRAGMA user_version = 1;
";
