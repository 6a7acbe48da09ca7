//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Mock data factories
//! - Time helpers
//! - Helper assertions

use crate::models::{
  ExerciseCatalogEntry, OneRmFormula, PersonalRecord, RecordKind, RemoteExerciseDocument,
  RemoteInstruction, RemoteMuscle, TrainingRecord,
};
use chrono::{DateTime, Duration, Utc};

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Shape of a logged workout for history fixtures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Success,
  Fail,
  /// Deload workout that hit its targets
  Deload,
  /// Deload workout that missed its targets
  DeloadFailed,
}

/// Create a mock training record in programme "prog-1"
pub fn mock_training_record(exercise: &str, outcome: Outcome, days_ago: i64) -> TrainingRecord {
  let (was_successful, is_deload_workout) = match outcome {
    Outcome::Success => (true, false),
    Outcome::Fail => (false, false),
    Outcome::Deload => (true, true),
    Outcome::DeloadFailed => (false, true),
  };

  TrainingRecord {
    programme_id: "prog-1".to_string(),
    exercise_name: exercise.to_string(),
    target_weight: 100.0,
    achieved_weight: 100.0,
    target_reps: 5,
    achieved_reps: if was_successful { 5 } else { 3 },
    completed_sets: if was_successful { 3 } else { 2 },
    target_sets: 3,
    was_successful,
    is_deload_workout,
    workout_date: datetime_days_ago(days_ago),
  }
}

/// Create a first-ever weight record with the default formula
pub fn mock_personal_record(
  exercise_id: &str,
  weight: f64,
  reps: u32,
  date: DateTime<Utc>,
) -> PersonalRecord {
  PersonalRecord::new(exercise_id, weight, reps, date, None, RecordKind::Weight, OneRmFormula::Epley)
}

/// Create a small catalog of barbell lifts with common aliases
pub fn mock_catalog() -> Vec<ExerciseCatalogEntry> {
  vec![
    ExerciseCatalogEntry::new("back-squat", "Back Squat").with_aliases(["squat"]),
    ExerciseCatalogEntry::new("bench-press", "Bench Press").with_aliases(["bench", "flat bench"]),
    ExerciseCatalogEntry::new("deadlift", "Deadlift").with_aliases(["conventional deadlift"]),
    ExerciseCatalogEntry::new("overhead-press", "Overhead Press")
      .with_aliases(["ohp", "military press"]),
    ExerciseCatalogEntry::new("barbell-row", "Barbell Row").with_aliases(["bent over row"]),
  ]
}

/// Create a fully populated remote exercise document
pub fn mock_remote_document(id: &str) -> RemoteExerciseDocument {
  RemoteExerciseDocument {
    id: id.to_string(),
    core_name: "Bench Press".to_string(),
    category: "CHEST".to_string(),
    movement_pattern: "HORIZONTAL_PUSH".to_string(),
    is_compound: true,
    name: "Barbell Bench Press".to_string(),
    equipment: "BARBELL".to_string(),
    difficulty: "INTERMEDIATE".to_string(),
    description: Some("Flat bench press with a straight bar".to_string()),
    rep_range_note: Some("3-8 for strength".to_string()),
    rest_seconds: Some(180),
    is_custom: false,
    muscles: vec![
      RemoteMuscle {
        muscle: "CHEST".to_string(),
        is_primary: true,
        emphasis: 0.6,
      },
      RemoteMuscle {
        muscle: "TRICEPS".to_string(),
        is_primary: false,
        emphasis: 0.25,
      },
      RemoteMuscle {
        muscle: "SHOULDERS".to_string(),
        is_primary: false,
        emphasis: 0.15,
      },
    ],
    aliases: vec!["bench".to_string(), "flat bench".to_string(), "BP".to_string()],
    instructions: vec![
      RemoteInstruction {
        kind: "SETUP".to_string(),
        content: "Retract shoulder blades".to_string(),
      },
      RemoteInstruction {
        kind: "EXECUTION".to_string(),
        content: "Lower bar to chest".to_string(),
      },
      RemoteInstruction {
        kind: "EXECUTION".to_string(),
        content: "Press to lockout".to_string(),
      },
    ],
    created_at: Some(datetime_days_ago(30)),
    updated_at: Some(datetime_days_ago(5)),
  }
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Create a DateTime N days ago from now
pub fn datetime_days_ago(days: i64) -> DateTime<Utc> {
  Utc::now() - Duration::days(days)
}

/// Create a DateTime representing now
pub fn datetime_now() -> DateTime<Utc> {
  Utc::now()
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mock_factories_create_valid_data() {
    let record = mock_training_record("squat", Outcome::DeloadFailed, 3);
    assert!(record.is_deload_workout);
    assert!(!record.was_successful);
    assert_eq!(record.programme_id, "prog-1");

    let pr = mock_personal_record("bench", 100.0, 5, datetime_now());
    assert!(pr.is_first_record());

    let catalog = mock_catalog();
    assert_eq!(catalog.len(), 5);
    assert!(catalog.iter().any(|e| e.aliases.contains("ohp")));

    let doc = mock_remote_document("remote-1");
    assert_eq!(doc.muscles.len(), 3);
    assert_eq!(doc.instructions.len(), 3);
  }

  #[test]
  fn test_datetime_helpers_produce_correct_dates() {
    let now = datetime_now();
    let past = datetime_days_ago(7);

    let diff = now - past;
    // Allow for slight timing differences (6-8 days is acceptable)
    assert!(
      diff.num_days() >= 6 && diff.num_days() <= 8,
      "Expected ~7 days difference, got {}",
      diff.num_days()
    );
  }
}
