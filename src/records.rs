//! Personal record selection
//!
//! Candidates are already-built [`PersonalRecord`] values. This module
//! deduplicates and ranks them per exercise for the recent and all-time
//! views, and classifies a freshly logged set against existing records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::models::{OneRmFormula, PersonalRecord, PreviousBest, RecordKind};

/// ---------------------------------------------------------------------------
/// Ranking
/// ---------------------------------------------------------------------------

/// Higher estimated 1RM wins, ties go to the more recent record
fn by_estimated_1rm_then_date(a: &PersonalRecord, b: &PersonalRecord) -> Ordering {
  a.estimated_1rm
    .total_cmp(&b.estimated_1rm)
    .then_with(|| a.record_date.cmp(&b.record_date))
}

fn by_weight_then_date(a: &PersonalRecord, b: &PersonalRecord) -> Ordering {
  a.weight
    .total_cmp(&b.weight)
    .then_with(|| a.record_date.cmp(&b.record_date))
}

/// ---------------------------------------------------------------------------
/// Recent view
/// ---------------------------------------------------------------------------

/// Best record per exercise dated within `window_days` before `now`.
///
/// Within an exercise the highest `estimated_1rm` wins, ties go to the most
/// recent date. Records outside the window are dropped before ranking, so an
/// old all-time best never hides a recent one. Output is newest first.
/// A window reaching past the representable date range has no lower bound.
pub fn recent_prs(candidates: &[PersonalRecord], now: DateTime<Utc>, window_days: i64) -> Vec<PersonalRecord> {
  let window_start = Duration::try_days(window_days).and_then(|window| now.checked_sub_signed(window));

  let mut best: BTreeMap<&str, &PersonalRecord> = BTreeMap::new();
  for candidate in candidates.iter().filter(|c| {
    c.record_date <= now && window_start.map_or(true, |start| c.record_date >= start)
  }) {
    best
      .entry(candidate.exercise_id.as_str())
      .and_modify(|current| {
        if by_estimated_1rm_then_date(candidate, *current) == Ordering::Greater {
          *current = candidate;
        }
      })
      .or_insert(candidate);
  }

  let mut selected: Vec<PersonalRecord> = best.into_values().cloned().collect();
  selected.sort_by(|a, b| {
    b.record_date
      .cmp(&a.record_date)
      .then_with(|| a.exercise_id.cmp(&b.exercise_id))
  });

  tracing::debug!(
    candidates = candidates.len(),
    selected = selected.len(),
    window_days,
    "Selected recent personal records"
  );
  selected
}

/// ---------------------------------------------------------------------------
/// All-time view
/// ---------------------------------------------------------------------------

/// Heaviest record ever logged for an exercise
pub fn max_weight<'a>(candidates: &'a [PersonalRecord], exercise_id: &str) -> Option<&'a PersonalRecord> {
  candidates
    .iter()
    .filter(|c| c.exercise_id == exercise_id)
    .max_by(|a, b| by_weight_then_date(a, b))
}

/// Highest estimated 1RM ever logged for an exercise
pub fn max_estimated_1rm<'a>(
  candidates: &'a [PersonalRecord],
  exercise_id: &str,
) -> Option<&'a PersonalRecord> {
  candidates
    .iter()
    .filter(|c| c.exercise_id == exercise_id)
    .max_by(|a, b| by_estimated_1rm_then_date(a, b))
}

/// All-time bests for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllTimeBests {
  pub max_weight: PersonalRecord,
  pub max_estimated_1rm: PersonalRecord,
}

/// All-time bests for every exercise that has candidates
pub fn all_time_bests(candidates: &[PersonalRecord]) -> BTreeMap<String, AllTimeBests> {
  let mut bests: BTreeMap<String, AllTimeBests> = BTreeMap::new();
  for candidate in candidates {
    match bests.get_mut(&candidate.exercise_id) {
      Some(entry) => {
        if by_weight_then_date(candidate, &entry.max_weight) == Ordering::Greater {
          entry.max_weight = candidate.clone();
        }
        if by_estimated_1rm_then_date(candidate, &entry.max_estimated_1rm) == Ordering::Greater {
          entry.max_estimated_1rm = candidate.clone();
        }
      }
      None => {
        bests.insert(
          candidate.exercise_id.clone(),
          AllTimeBests {
            max_weight: candidate.clone(),
            max_estimated_1rm: candidate.clone(),
          },
        );
      }
    }
  }
  bests
}

/// ---------------------------------------------------------------------------
/// Detection
/// ---------------------------------------------------------------------------

/// Classify a logged set against the existing records for its exercise.
///
/// Returns a new record when the set beats a previous best, checked in order:
/// heavier weight, higher estimated 1RM, more volume, more reps at the same
/// weight. The first record for an exercise is a weight record with no
/// previous values.
///
/// A zero weight is a bodyweight set and only competes on reps against other
/// bodyweight sets. Zero reps, negative or non-finite weights never set a
/// record.
pub fn detect_record(
  existing: &[PersonalRecord],
  exercise_id: &str,
  weight: f64,
  reps: u32,
  date: DateTime<Utc>,
  formula: OneRmFormula,
) -> Option<PersonalRecord> {
  if reps == 0 || !weight.is_finite() || weight < 0.0 {
    return None;
  }

  let history: Vec<&PersonalRecord> = existing.iter().filter(|r| r.exercise_id == exercise_id).collect();
  let previous = |r: &PersonalRecord| PreviousBest {
    weight: r.weight,
    reps: r.reps,
    date: r.record_date,
  };
  let most_reps_at_weight = history
    .iter()
    .copied()
    .filter(|r| r.weight == weight)
    .max_by_key(|r| (r.reps, r.record_date));

  let kind_and_previous = if weight == 0.0 {
    match most_reps_at_weight {
      None => Some((RecordKind::Reps, None)),
      Some(best) if reps > best.reps => Some((RecordKind::Reps, Some(previous(best)))),
      Some(_) => None,
    }
  } else if history.is_empty() {
    Some((RecordKind::Weight, None))
  } else {
    let estimated = formula.estimate(weight, reps);
    let volume = weight * reps as f64;
    let heaviest = history.iter().copied().max_by(|a, b| by_weight_then_date(a, b))?;
    let strongest = history.iter().copied().max_by(|a, b| by_estimated_1rm_then_date(a, b))?;
    let biggest = history.iter().copied().max_by(|a, b| {
      a.volume
        .total_cmp(&b.volume)
        .then_with(|| a.record_date.cmp(&b.record_date))
    })?;

    if weight > heaviest.weight {
      Some((RecordKind::Weight, Some(previous(heaviest))))
    } else if estimated > strongest.estimated_1rm {
      Some((RecordKind::EstimatedOneRm, Some(previous(strongest))))
    } else if volume > biggest.volume {
      Some((RecordKind::Volume, Some(previous(biggest))))
    } else {
      most_reps_at_weight
        .filter(|r| reps > r.reps)
        .map(|r| (RecordKind::Reps, Some(previous(r))))
    }
  };

  kind_and_previous.map(|(kind, prev)| {
    tracing::info!(exercise = exercise_id, ?kind, weight, reps, "New personal record");
    PersonalRecord::new(exercise_id, weight, reps, date, prev, kind, formula)
  })
}

/// ---------------------------------------------------------------------------
/// Configured selector
/// ---------------------------------------------------------------------------

/// Recent window and 1RM formula taken from [`EngineConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordSelector {
  pub window_days: i64,
  pub formula: OneRmFormula,
}

impl Default for RecordSelector {
  fn default() -> Self {
    Self::from_config(&EngineConfig::default())
  }
}

impl RecordSelector {
  pub fn from_config(config: &EngineConfig) -> Self {
    Self {
      window_days: config.recent_pr_window_days,
      formula: config.one_rm_formula,
    }
  }

  pub fn recent(&self, candidates: &[PersonalRecord], now: DateTime<Utc>) -> Vec<PersonalRecord> {
    recent_prs(candidates, now, self.window_days)
  }

  pub fn detect(
    &self,
    existing: &[PersonalRecord],
    exercise_id: &str,
    weight: f64,
    reps: u32,
    date: DateTime<Utc>,
  ) -> Option<PersonalRecord> {
    detect_record(existing, exercise_id, weight, reps, date, self.formula)
  }
}
