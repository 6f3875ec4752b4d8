//! Reader for the politician profile feed.
//!
//! One JSON object per file, one person per object. Missing fields default
//! to empty — only a missing native `id` rejects the record, since without
//! it no stable person identity can be derived.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use aula_core::{
  entity::{Person, Role},
  id::PersonId,
  normalize::parse_date_soft,
};

use crate::error::{Error, Result};

/// Source name used to qualify person ids and `source_ids` keys.
pub const PROFILE_SOURCE: &str = "op";

// ─── Raw record shape ────────────────────────────────────────────────────────

/// The profile feed's record shape, validated at the reader boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRecord {
  /// Source-native numeric id. Required.
  pub id:            i64,
  #[serde(default)]
  pub family_name:   String,
  #[serde(default)]
  pub given_name:    String,
  #[serde(default)]
  pub current_roles: Option<CurrentRoles>,
  #[serde(default)]
  pub birth_date:    Option<String>,
  #[serde(default)]
  pub birth_place:   Option<String>,
  #[serde(default, rename = "image")]
  pub image_url:     Option<String>,
  #[serde(default)]
  pub slug:          Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentRoles {
  #[serde(default)]
  pub parl: Option<ParlRole>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParlRole {
  #[serde(default)]
  pub role:         Option<String>,
  #[serde(default)]
  pub start_date:   Option<String>,
  #[serde(default)]
  pub end_date:     Option<String>,
  #[serde(default)]
  pub latest_group: Option<Group>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Group {
  #[serde(default)]
  pub acronym: Option<String>,
  #[serde(default)]
  pub name:    Option<String>,
}

impl ProfileRecord {
  fn parl(&self) -> Option<&ParlRole> {
    self.current_roles.as_ref().and_then(|cr| cr.parl.as_ref())
  }

  /// The party affiliation: the latest group's acronym, falling back to
  /// its full name.
  pub fn party(&self) -> Option<String> {
    let group = self.parl()?.latest_group.as_ref()?;
    group
      .acronym
      .clone()
      .filter(|s| !s.is_empty())
      .or_else(|| group.name.clone().filter(|s| !s.is_empty()))
  }

  /// Build the candidate canonical person. `raw` is the full JSON payload,
  /// retained on the row for future re-processing.
  pub fn into_person(self, raw: Value) -> Person {
    let person_id = PersonId::from_source(PROFILE_SOURCE, &self.id.to_string());
    let party = self.party();

    let roles = self
      .parl()
      .map(|parl| {
        vec![Role {
          role:       parl.role.clone().unwrap_or_default(),
          start_date: parse_date_soft(parl.start_date.as_deref()),
          end_date:   parse_date_soft(parl.end_date.as_deref()),
          party:      party.clone(),
        }]
      })
      .unwrap_or_default();

    let family_name = self.family_name.trim().to_owned();
    let given_name = self.given_name.trim().to_owned();
    let full_name = format!("{family_name} {given_name}").trim().to_owned();

    let mut source_ids = std::collections::BTreeMap::new();
    source_ids.insert("openparlamento".to_owned(), format!("p{}", self.id));
    if let Some(slug) = &self.slug {
      source_ids.insert("slug".to_owned(), slug.clone());
    }

    Person {
      person_id,
      full_name,
      family_name,
      given_name,
      party,
      roles,
      source_ids,
      birth_date: parse_date_soft(self.birth_date.as_deref()),
      birth_place: self.birth_place,
      image_url: self.image_url,
      slug: self.slug,
      raw: Some(raw),
    }
  }
}

// ─── Unit ────────────────────────────────────────────────────────────────────

/// One profile raw unit: a single person record read from one file.
#[derive(Debug, Clone)]
pub struct ProfileUnit {
  /// The unit's identity for logging — the filename.
  pub unit_id: String,
  pub person:  Person,
}

/// Read and validate one profile file.
pub fn read_profile_unit(path: &Path) -> Result<ProfileUnit> {
  let unit_id = crate::unit_name(path);

  let body = std::fs::read_to_string(path).map_err(|source| Error::Io {
    path: path.display().to_string(),
    source,
  })?;

  let raw: Value = serde_json::from_str(&body).map_err(|source| Error::Json {
    path: path.display().to_string(),
    source,
  })?;

  let record: ProfileRecord = serde_json::from_value(raw.clone())
    .map_err(|e| Error::MalformedRecord(format!("{unit_id}: {e}")))?;

  Ok(ProfileUnit {
    unit_id,
    person: record.into_person(raw),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn record(value: Value) -> ProfileRecord {
    serde_json::from_value(value).expect("profile record")
  }

  #[test]
  fn missing_fields_default_to_empty() {
    let value = json!({ "id": 42 });
    let person = record(value.clone()).into_person(value);
    assert_eq!(person.person_id.as_str(), "op_42");
    assert_eq!(person.full_name, "");
    assert_eq!(person.family_name, "");
    assert!(person.party.is_none());
    assert!(person.roles.is_empty());
    assert_eq!(person.source_ids["openparlamento"], "p42");
  }

  #[test]
  fn missing_id_is_malformed() {
    let value = json!({ "family_name": "Rossi" });
    assert!(serde_json::from_value::<ProfileRecord>(value).is_err());
  }

  #[test]
  fn party_prefers_acronym_over_name() {
    let value = json!({
      "id": 7,
      "family_name": "Rossi",
      "given_name": "Mario",
      "current_roles": {
        "parl": {
          "role": "deputato",
          "start_date": "2022-10-13",
          "latest_group": { "acronym": "XY", "name": "Gruppo XY" }
        }
      }
    });
    let person = record(value.clone()).into_person(value);
    assert_eq!(person.party.as_deref(), Some("XY"));
    assert_eq!(person.full_name, "Rossi Mario");
    assert_eq!(person.roles.len(), 1);
    assert_eq!(person.roles[0].role, "deputato");
    assert_eq!(
      person.roles[0].start_date,
      chrono::NaiveDate::from_ymd_opt(2022, 10, 13)
    );
  }

  #[test]
  fn party_falls_back_to_group_name() {
    let value = json!({
      "id": 8,
      "current_roles": {
        "parl": { "latest_group": { "acronym": "", "name": "Gruppo Misto" } }
      }
    });
    let person = record(value.clone()).into_person(value);
    assert_eq!(person.party.as_deref(), Some("Gruppo Misto"));
  }
}
