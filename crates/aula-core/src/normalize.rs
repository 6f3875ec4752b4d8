//! Pure text and date normalization, independent of source.
//!
//! Every function here is total: bad input degrades to an empty string or a
//! `None` sentinel, never an error. The pipeline decides what to do with
//! degenerate output (usually: skip the record).

use chrono::NaiveDate;

/// Honorific and role tokens stripped from speaker names before matching.
/// Matched as whole tokens after uppercasing, never as substrings.
const HONORIFICS: &[&str] = &[
  "PRESIDENTE",
  "PRESIDENTA",
  "ON",
  "ONOREVOLE",
  "SENATORE",
  "SENATRICE",
  "DEPUTATO",
  "DEPUTATA",
  "MINISTRO",
  "MINISTRA",
];

/// Canonicalize a name for matching: uppercase, strip honorifics, drop
/// characters outside letters/digits/whitespace, collapse whitespace, trim.
///
/// Idempotent: `normalize_name(normalize_name(x)) == normalize_name(x)`.
pub fn normalize_name(raw: &str) -> String {
  let upper: String = raw
    .to_uppercase()
    .chars()
    .filter(|c| c.is_alphanumeric() || c.is_whitespace())
    .collect();

  upper
    .split_whitespace()
    .filter(|token| !HONORIFICS.contains(token))
    .collect::<Vec<_>>()
    .join(" ")
}

/// Normalize a speech body or title: trim; all-whitespace becomes empty.
pub fn normalize_text(raw: &str) -> String { raw.trim().to_owned() }

/// Parse an ISO `YYYY-MM-DD` date, failing soft: invalid or missing input
/// yields `None`, the unknown-date sentinel.
pub fn parse_date_soft(raw: Option<&str>) -> Option<NaiveDate> {
  let raw = raw?.trim();
  NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_honorifics_as_whole_tokens() {
    assert_eq!(
      normalize_name("PRESIDENTE LI Silvana Andreina"),
      "LI SILVANA ANDREINA"
    );
    assert_eq!(normalize_name("On. Mario Rossi"), "MARIO ROSSI");
    // "PRESIDENTESSA" is not in the closed set and must survive intact.
    assert_eq!(normalize_name("Presidentessa Bianchi"), "PRESIDENTESSA BIANCHI");
  }

  #[test]
  fn removes_punctuation_and_collapses_whitespace() {
    assert_eq!(normalize_name("  D'Alema,   Massimo  "), "DALEMA MASSIMO");
    assert_eq!(normalize_name("ROSSI\t\nMario"), "ROSSI MARIO");
  }

  #[test]
  fn is_idempotent() {
    for raw in [
      "PRESIDENTE LI Silvana Andreina",
      "on. D'Alema, Massimo",
      "",
      "   ",
      "???",
      "ministro MINISTRO ministra",
    ] {
      let once = normalize_name(raw);
      assert_eq!(normalize_name(&once), once, "not idempotent for {raw:?}");
    }
  }

  #[test]
  fn degenerate_input_yields_empty() {
    assert_eq!(normalize_name(""), "");
    assert_eq!(normalize_name("  ,.;  "), "");
    assert_eq!(normalize_name("Onorevole"), "");
  }

  #[test]
  fn normalize_text_trims_to_empty() {
    assert_eq!(normalize_text("  ciao  "), "ciao");
    assert_eq!(normalize_text(" \t\n "), "");
  }

  #[test]
  fn date_parsing_fails_soft() {
    assert_eq!(
      parse_date_soft(Some("2024-03-12")),
      NaiveDate::from_ymd_opt(2024, 3, 12)
    );
    assert_eq!(parse_date_soft(Some("12/03/2024")), None);
    assert_eq!(parse_date_soft(Some("not a date")), None);
    assert_eq!(parse_date_soft(None), None);
  }
}
