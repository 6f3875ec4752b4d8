//! Per-unit and per-run outcome reporting.
//!
//! Each unit moves through `Pending → Processing → {Committed, RolledBack}`.
//! The terminal states are the only observable ones and there is no retry
//! transition — a rolled-back unit is retried only by re-invoking the
//! orchestrator on the same raw input, which is safe because upserts skip
//! on existing deterministic ids.

use crate::merge::WriteOutcome;

/// Terminal disposition of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
  Committed,
  RolledBack,
}

/// Record-level tallies for one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitCounts {
  pub created:      u32,
  pub updated:      u32,
  pub skipped:      u32,
  /// Placeholder persons created for unresolved speakers.
  pub placeholders: u32,
}

impl UnitCounts {
  pub fn absorb(&mut self, outcome: WriteOutcome) {
    match outcome {
      WriteOutcome::Created => self.created += 1,
      WriteOutcome::Updated => self.updated += 1,
      WriteOutcome::Skipped => self.skipped += 1,
    }
  }

  pub fn add(&mut self, other: UnitCounts) {
    self.created += other.created;
    self.updated += other.updated;
    self.skipped += other.skipped;
    self.placeholders += other.placeholders;
  }
}

/// The structured outcome of one unit, as also emitted on the tracing
/// side channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
  pub unit_id: String,
  pub outcome: UnitOutcome,
  pub counts:  UnitCounts,
}

/// All unit reports of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
  pub units: Vec<UnitReport>,
}

impl RunReport {
  pub fn committed(&self) -> usize {
    self
      .units
      .iter()
      .filter(|u| u.outcome == UnitOutcome::Committed)
      .count()
  }

  pub fn rolled_back(&self) -> usize {
    self.units.len() - self.committed()
  }

  pub fn totals(&self) -> UnitCounts {
    let mut totals = UnitCounts::default();
    for unit in &self.units {
      totals.add(unit.counts);
    }
    totals
  }
}
