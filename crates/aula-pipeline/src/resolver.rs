//! Speaker name resolution against the known-person roster.
//!
//! An ordered matching cascade, first success wins, evaluated over
//! normalized names. The cascade trades recall for precision at its final
//! step — it never guesses between multiple same-surname candidates — while
//! still guaranteeing every speech gets *some* valid speaker reference, via
//! deterministic placeholder synthesis. The resolver itself does not log;
//! it reports the outcome and the caller decides what to record.

use std::collections::HashMap;

use aula_core::{
  entity::Person,
  id::PersonId,
  normalize::normalize_name,
};

// ─── Resolution outcome ──────────────────────────────────────────────────────

/// Which cascade step produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
  Exact,
  ReversedTokens,
  SurnameFirst,
  GivenFirst,
  SurnameGiven,
  SurnameOnly,
}

/// The outcome of resolving one raw speaker name. Never a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
  /// The name matched a known person.
  Matched { person_id: PersonId, rule: MatchRule },
  /// No match; a deterministic placeholder person stands in. The caller
  /// must upsert `person` before writing any speech that references it.
  Placeholder { person: Person },
}

impl Resolution {
  pub fn person_id(&self) -> &PersonId {
    match self {
      Resolution::Matched { person_id, .. } => person_id,
      Resolution::Placeholder { person } => &person.person_id,
    }
  }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

struct RosterEntry {
  person_id: PersonId,
  /// Normalized given name(s); possibly empty.
  given:     String,
  /// Normalized family name(s); possibly empty.
  family:    String,
}

/// Resolves free-text speaker names to canonical person ids.
///
/// The roster is cached up front as normalized keys. Placeholders
/// synthesized during a run are remembered, so repeated appearances of the
/// same unknown speaker share one placeholder person.
pub struct SpeakerResolver {
  entries:      Vec<RosterEntry>,
  /// Normalized key → index into `entries`. On collision the entry with
  /// the lowest person id wins, so resolution is deterministic.
  keys:         HashMap<String, usize>,
  placeholders: HashMap<String, Person>,
}

impl SpeakerResolver {
  /// Build the roster cache. `roster` should be ordered by person id (the
  /// store returns it that way); earlier entries win key collisions.
  pub fn new(roster: Vec<Person>) -> Self {
    let mut entries = Vec::with_capacity(roster.len());
    let mut keys: HashMap<String, usize> = HashMap::new();

    for person in roster {
      let given = normalize_name(&person.given_name);
      let family = normalize_name(&person.family_name);
      let full = normalize_name(&person.full_name);

      let idx = entries.len();
      entries.push(RosterEntry {
        person_id: person.person_id,
        given: given.clone(),
        family: family.clone(),
      });

      let mut insert = |key: String| {
        if !key.is_empty() {
          keys.entry(key).or_insert(idx);
        }
      };
      if !family.is_empty() && !given.is_empty() {
        insert(format!("{family} {given}"));
        insert(format!("{given} {family}"));
      }
      insert(full);
    }

    Self {
      entries,
      keys,
      placeholders: HashMap::new(),
    }
  }

  /// Resolve a raw speaker name. Total: always yields a usable id.
  pub fn resolve(&mut self, raw_name: &str) -> Resolution {
    let normalized = normalize_name(raw_name);

    if let Some((person_id, rule)) = self.match_cascade(&normalized) {
      return Resolution::Matched { person_id, rule };
    }

    let person = self
      .placeholders
      .entry(normalized.clone())
      .or_insert_with(|| synthesize_placeholder(raw_name, &normalized))
      .clone();
    Resolution::Placeholder { person }
  }

  fn match_cascade(&self, normalized: &str) -> Option<(PersonId, MatchRule)> {
    if normalized.is_empty() {
      return None;
    }

    // 1. Exact.
    if let Some(id) = self.lookup(normalized) {
      return Some((id, MatchRule::Exact));
    }

    let parts: Vec<&str> = normalized.split_whitespace().collect();

    if parts.len() >= 2 {
      // 2. Reverse token order ("SURNAME given" vs "given SURNAME").
      let reversed = parts.iter().rev().copied().collect::<Vec<_>>().join(" ");
      if let Some(id) = self.lookup(&reversed) {
        return Some((id, MatchRule::ReversedTokens));
      }

      // 3. First token as surname: canonical "given-names surname".
      let given_then_surname = format!("{} {}", parts[1..].join(" "), parts[0]);
      if let Some(id) = self.lookup(&given_then_surname) {
        return Some((id, MatchRule::SurnameFirst));
      }

      // 4. Last token as surname: canonical "surname given-names".
      let surname_then_given = format!(
        "{} {}",
        parts[parts.len() - 1],
        parts[..parts.len() - 1].join(" ")
      );
      if let Some(id) = self.lookup(&surname_then_given) {
        return Some((id, MatchRule::GivenFirst));
      }

      // 5. Loosen to surname + first given name, either orientation.
      let first = parts[0];
      let last = parts[parts.len() - 1];
      let mut candidates = self.entries.iter().filter(|e| {
        let family_last = e.family.split_whitespace().next_back();
        let given_first = e.given.split_whitespace().next();
        match (family_last, given_first) {
          (Some(f), Some(g)) => {
            (f == last && g == first) || (f == first && g == last)
          }
          _ => false,
        }
      });
      // Multiple candidates: take the first (roster is ordered by id).
      if let Some(entry) = candidates.next() {
        return Some((entry.person_id.clone(), MatchRule::SurnameGiven));
      }
    }

    // 6. Surname only — accepted only when exactly one known person bears
    // that surname. Ambiguity is never silently resolved.
    let surname = *parts.last()?;
    let mut with_surname = self
      .entries
      .iter()
      .filter(|e| e.family.split_whitespace().next_back() == Some(surname));
    match (with_surname.next(), with_surname.next()) {
      (Some(only), None) => Some((only.person_id.clone(), MatchRule::SurnameOnly)),
      _ => None,
    }
  }

  fn lookup(&self, key: &str) -> Option<PersonId> {
    self
      .keys
      .get(key)
      .map(|&idx| self.entries[idx].person_id.clone())
  }
}

/// Build the placeholder person for an unresolved speaker: the id is
/// derived from the normalized name, the name fields from the raw tokens.
fn synthesize_placeholder(raw_name: &str, normalized: &str) -> Person {
  let tokens: Vec<&str> = raw_name.split_whitespace().collect();

  let mut person = Person::empty(PersonId::placeholder(normalized));
  person.full_name = raw_name.trim().to_owned();
  person.family_name = tokens.last().copied().unwrap_or(raw_name).to_owned();
  person.given_name = if tokens.len() > 1 {
    tokens[0].to_owned()
  } else {
    String::new()
  };
  person
}
