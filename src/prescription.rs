//! Set prescription
//!
//! Turns a programme-week exercise spec plus the lifter's tested maxes into
//! concrete per-set targets:
//! - weight from a percentage of the matching lift's max, floored to the
//!   plate increment (conservative, never rounded up)
//! - reps from whichever rep encoding the programme used
//!
//! Malformed optional input never fails; it degrades to the defaults below.

use crate::config::EngineConfig;
use crate::models::{ProgrammeExerciseSpec, RepsSpec, SetPrescription, UserMaxes, AMRAP_MARKER};

/// Reps used when a "lo-hi" range string cannot be parsed
pub const DEFAULT_RANGE_REPS: u32 = 8;

/// Reps used when a per-set list is empty or an entry cannot be parsed
pub const DEFAULT_PER_SET_REPS: u32 = 5;

/// Absorbs binary float error so exact multiples do not floor one step low
const FLOOR_EPSILON: f64 = 1e-9;

/// ---------------------------------------------------------------------------
/// Weight
/// ---------------------------------------------------------------------------

/// Resolve the working weight for a set.
///
/// Returns `base_weight` unchanged when there is no intensity, the name does
/// not map to a known lift, or no max is recorded for that lift. Otherwise
/// floors `max * intensity / 100` to a multiple of `increment`.
pub fn calculate_weight(
  exercise_name: &str,
  intensity_pct: Option<f64>,
  maxes: &UserMaxes,
  base_weight: f64,
  increment: f64,
) -> f64 {
  let Some(intensity) = intensity_pct else {
    return base_weight;
  };
  let Some(max) = maxes.for_exercise(exercise_name) else {
    tracing::debug!(exercise = exercise_name, "No tested max for exercise, using base weight");
    return base_weight;
  };

  let raw = max * intensity / 100.0;
  floor_to_increment(raw, increment)
}

/// Floor `value` to the nearest multiple of `increment` at or below it.
/// A non-positive increment leaves the value unrounded.
pub fn floor_to_increment(value: f64, increment: f64) -> f64 {
  if increment <= 0.0 || !increment.is_finite() {
    return value;
  }
  let steps = (value / increment + FLOOR_EPSILON).floor();
  steps * increment
}

/// ---------------------------------------------------------------------------
/// Reps
/// ---------------------------------------------------------------------------

impl RepsSpec {
  /// Rep target for the zero-based `set_index`
  pub fn reps_for_set(&self, set_index: usize) -> u32 {
    match self {
      RepsSpec::Single { reps } => *reps,
      RepsSpec::Range { min, max } => ((*min as u64 + *max as u64) / 2) as u32,
      RepsSpec::RangeString { raw } => parse_range(raw).unwrap_or(DEFAULT_RANGE_REPS),
      RepsSpec::PerSet { sets } => per_set_entry(sets, set_index)
        .and_then(parse_per_set_entry)
        .unwrap_or(DEFAULT_PER_SET_REPS),
    }
  }

  /// Whether the set at `set_index` is an AMRAP set
  pub fn is_amrap(&self, set_index: usize) -> bool {
    match self {
      RepsSpec::PerSet { sets } => per_set_entry(sets, set_index)
        .is_some_and(|entry| entry.trim_end().ends_with(AMRAP_MARKER)),
      _ => false,
    }
  }
}

/// Resolve the rep target for a set
pub fn resolve_reps(spec: &RepsSpec, set_index: usize) -> u32 {
  spec.reps_for_set(set_index)
}

/// Clamp `set_index` into the list; past-the-end reads the last entry
fn per_set_entry(sets: &[String], set_index: usize) -> Option<&str> {
  let last = sets.len().checked_sub(1)?;
  sets.get(set_index.min(last)).map(String::as_str)
}

fn parse_per_set_entry(entry: &str) -> Option<u32> {
  let trimmed = entry.trim();
  let digits = trimmed.strip_suffix(AMRAP_MARKER).unwrap_or(trimmed).trim();
  digits.parse().ok()
}

/// Parse "lo-hi" into the truncating midpoint
fn parse_range(raw: &str) -> Option<u32> {
  let (lo, hi) = raw.split_once('-')?;
  let lo: u32 = lo.trim().parse().ok()?;
  let hi: u32 = hi.trim().parse().ok()?;
  Some(((lo as u64 + hi as u64) / 2) as u32)
}

/// ---------------------------------------------------------------------------
/// Whole exercise
/// ---------------------------------------------------------------------------

/// Build one prescription per set of `spec`
pub fn prescribe_exercise(
  spec: &ProgrammeExerciseSpec,
  maxes: &UserMaxes,
  base_weight: f64,
  config: &EngineConfig,
) -> Vec<SetPrescription> {
  let prescriptions: Vec<SetPrescription> = (0..spec.sets as usize)
    .map(|set_index| {
      let intensity = spec.intensity_for_set(set_index);
      SetPrescription {
        set_index,
        weight: calculate_weight(&spec.name, intensity, maxes, base_weight, config.rounding_increment),
        reps: spec.reps.reps_for_set(set_index),
        is_amrap: spec.reps.is_amrap(set_index),
        intensity,
      }
    })
    .collect();

  tracing::debug!(
    exercise = %spec.name,
    sets = prescriptions.len(),
    "Prescribed exercise"
  );
  prescriptions
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::LiftKey;

  fn maxes() -> UserMaxes {
    UserMaxes::new()
      .with(LiftKey::Squat, 100.0)
      .with(LiftKey::Bench, 100.0)
      .with(LiftKey::Deadlift, 200.0)
  }

  fn per_set(entries: &[&str]) -> RepsSpec {
    RepsSpec::PerSet {
      sets: entries.iter().map(|s| s.to_string()).collect(),
    }
  }

  #[test]
  fn test_weight_floors_to_increment() {
    let maxes = maxes();
    assert_eq!(calculate_weight("Squat", Some(73.0), &maxes, 20.0, 2.5), 72.5);
    assert_eq!(calculate_weight("Squat", Some(74.0), &maxes, 20.0, 2.5), 72.5);
    assert_eq!(calculate_weight("Squat", Some(76.0), &maxes, 20.0, 2.5), 75.0);
  }

  #[test]
  fn test_weight_exact_multiples_do_not_drop_a_step() {
    let maxes = maxes();
    assert_eq!(calculate_weight("Bench Press", Some(80.0), &maxes, 20.0, 2.5), 80.0);
    assert_eq!(calculate_weight("Deadlift", Some(85.0), &maxes, 20.0, 2.5), 170.0);
  }

  #[test]
  fn test_unknown_exercise_returns_base_weight() {
    let maxes = maxes();
    assert_eq!(calculate_weight("Barbell Row", Some(80.0), &maxes, 42.5, 2.5), 42.5);
    assert_eq!(calculate_weight("Lat Pulldown", Some(5.0), &maxes, 30.0, 2.5), 30.0);
  }

  #[test]
  fn test_missing_intensity_or_max_returns_base_weight() {
    let maxes = maxes();
    assert_eq!(calculate_weight("Squat", None, &maxes, 60.0, 2.5), 60.0);
    assert_eq!(calculate_weight("Overhead Press", Some(70.0), &maxes, 40.0, 2.5), 40.0);
  }

  #[test]
  fn test_non_positive_increment_skips_rounding() {
    assert_eq!(floor_to_increment(73.3, 0.0), 73.3);
    assert_eq!(floor_to_increment(73.3, -2.5), 73.3);
  }

  #[test]
  fn test_single_and_range_reps() {
    assert_eq!(resolve_reps(&RepsSpec::Single { reps: 5 }, 0), 5);
    assert_eq!(resolve_reps(&RepsSpec::Single { reps: 5 }, 9), 5);
    assert_eq!(resolve_reps(&RepsSpec::Range { min: 8, max: 12 }, 0), 10);
    assert_eq!(resolve_reps(&RepsSpec::Range { min: 8, max: 11 }, 3), 9);
  }

  #[test]
  fn test_range_string_reps() {
    let spec = RepsSpec::RangeString { raw: "6 - 9".to_string() };
    assert_eq!(resolve_reps(&spec, 0), 7);

    let invalid = RepsSpec::RangeString { raw: "invalid".to_string() };
    assert_eq!(resolve_reps(&invalid, 0), DEFAULT_RANGE_REPS);
    assert_eq!(resolve_reps(&invalid, 0), 8);
  }

  #[test]
  fn test_per_set_reps_with_amrap() {
    let spec = per_set(&["5", "3", "1+"]);
    assert_eq!(resolve_reps(&spec, 0), 5);
    assert_eq!(resolve_reps(&spec, 2), 1);
    // Out of range reads the last entry
    assert_eq!(resolve_reps(&spec, 5), 1);
    assert!(spec.is_amrap(2));
    assert!(spec.is_amrap(7));
    assert!(!spec.is_amrap(0));
  }

  #[test]
  fn test_per_set_defaults() {
    assert_eq!(resolve_reps(&per_set(&[]), 0), 5);
    assert_eq!(resolve_reps(&per_set(&["5", "many"]), 1), DEFAULT_PER_SET_REPS);
    assert!(!per_set(&[]).is_amrap(0));
  }

  #[test]
  fn test_prescribe_exercise_per_set() {
    let spec = ProgrammeExerciseSpec {
      name: "Back Squat".to_string(),
      sets: 3,
      reps: per_set(&["5", "3", "1+"]),
      intensity_per_set: vec![75.0, 85.0, 95.0],
      progression: Some("531".to_string()),
    };
    let sets = prescribe_exercise(&spec, &maxes(), 20.0, &EngineConfig::default());

    assert_eq!(sets.len(), 3);
    assert_eq!(sets[0].weight, 75.0);
    assert_eq!(sets[1].weight, 85.0);
    assert_eq!(sets[2].weight, 95.0);
    assert_eq!(sets[2].reps, 1);
    assert!(sets[2].is_amrap);
    assert_eq!(sets[1].intensity, Some(85.0));
  }

  #[test]
  fn test_prescribe_accessory_uses_base_weight() {
    let spec = ProgrammeExerciseSpec {
      name: "Dumbbell Curl".to_string(),
      sets: 3,
      reps: RepsSpec::Range { min: 10, max: 15 },
      intensity_per_set: vec![],
      progression: None,
    };
    let sets = prescribe_exercise(&spec, &maxes(), 12.5, &EngineConfig::default());

    assert!(sets.iter().all(|s| s.weight == 12.5 && s.reps == 12 && s.intensity.is_none()));
  }
}
