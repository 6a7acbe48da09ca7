//! Failure-Based Progression Tracking
//!
//! Reads the logged history of one `(programme_id, exercise_name)` pair and
//! decides what the next session should do:
//! - consecutive failures since the last success or deload
//! - deload bookkeeping (how many, when, whether we're in one now)
//! - a suggested action from explicit thresholds
//!
//! Key principles:
//! - Scans take history newest-first and never reorder it
//! - A success or a deload session resets the failure count
//! - Thresholds come from config, never from hidden constants

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ProgressionThresholds;
use crate::models::TrainingRecord;

// ---------------------------------------------------------------------------
/// Suggested Action: what the next session should do
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressionAction {
  /// Last session succeeded, add load
  Progress,
  /// Recent failure, repeat the same load
  Maintain,
  /// Failure streak hit the deload threshold
  Deload,
  /// Repeated deloads are not restoring progress, restart the cycle
  Reset,
  /// Long success streak, time to retest the max
  #[serde(rename = "TEST_1RM")]
  Test1Rm,
}

impl std::fmt::Display for ProgressionAction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Progress => write!(f, "PROGRESS"),
      Self::Maintain => write!(f, "MAINTAIN"),
      Self::Deload => write!(f, "DELOAD"),
      Self::Reset => write!(f, "RESET"),
      Self::Test1Rm => write!(f, "TEST_1RM"),
    }
  }
}

impl std::str::FromStr for ProgressionAction {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "PROGRESS" => Ok(Self::Progress),
      "MAINTAIN" => Ok(Self::Maintain),
      "DELOAD" => Ok(Self::Deload),
      "RESET" => Ok(Self::Reset),
      "TEST_1RM" => Ok(Self::Test1Rm),
      _ => Err(format!("Unknown progression action: {}", s)),
    }
  }
}

// ---------------------------------------------------------------------------
/// Failure scan
// ---------------------------------------------------------------------------

/// Count failures from the newest record back to the first success or deload.
/// The boundary record itself is not counted; with no boundary, every record
/// counts.
pub fn consecutive_failures(records_newest_first: &[TrainingRecord]) -> u32 {
  records_newest_first
    .iter()
    .take_while(|r| !r.is_reset_boundary())
    .count() as u32
}

/// Successful, non-deload sessions from the newest record back
fn success_streak(records_newest_first: &[TrainingRecord]) -> u32 {
  records_newest_first
    .iter()
    .take_while(|r| r.was_successful && !r.is_deload_workout)
    .count() as u32
}

// ---------------------------------------------------------------------------
/// Progression Status: full picture for one exercise
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionStatus {
  pub consecutive_failures: u32,
  pub total_deloads: u32,
  /// Newest session was a deload
  pub is_in_deload_cycle: bool,
  pub last_success_date: Option<DateTime<Utc>>,
  pub last_deload_date: Option<DateTime<Utc>>,
  pub success_streak: u32,
  pub suggested_action: ProgressionAction,
  pub reason: String,
}

impl ProgressionStatus {
  /// Compute status from newest-first history
  pub fn compute(records_newest_first: &[TrainingRecord], thresholds: &ProgressionThresholds) -> Self {
    let consecutive_failures = consecutive_failures(records_newest_first);
    let success_streak = success_streak(records_newest_first);
    let total_deloads = records_newest_first
      .iter()
      .filter(|r| r.is_deload_workout)
      .count() as u32;
    let is_in_deload_cycle = records_newest_first
      .first()
      .is_some_and(|r| r.is_deload_workout);
    let last_success_date = records_newest_first
      .iter()
      .filter(|r| r.was_successful)
      .map(|r| r.workout_date)
      .max();
    let last_deload_date = records_newest_first
      .iter()
      .filter(|r| r.is_deload_workout)
      .map(|r| r.workout_date)
      .max();

    let (suggested_action, reason) = Self::decide(
      records_newest_first.is_empty(),
      consecutive_failures,
      total_deloads,
      success_streak,
      last_success_date,
      last_deload_date,
      thresholds,
    );

    tracing::debug!(
      consecutive_failures,
      total_deloads,
      action = %suggested_action,
      "Computed progression status"
    );

    Self {
      consecutive_failures,
      total_deloads,
      is_in_deload_cycle,
      last_success_date,
      last_deload_date,
      success_streak,
      suggested_action,
      reason,
    }
  }

  /// Decision function, first matching rule wins:
  /// 1. no history -> PROGRESS
  /// 2. failures >= deload threshold, deloads >= reset threshold and no
  ///    success since the last deload -> RESET
  /// 3. failures >= deload threshold -> DELOAD
  /// 4. any failure -> MAINTAIN
  /// 5. success streak >= test threshold -> TEST_1RM
  /// 6. otherwise -> PROGRESS
  fn decide(
    no_history: bool,
    failures: u32,
    total_deloads: u32,
    success_streak: u32,
    last_success: Option<DateTime<Utc>>,
    last_deload: Option<DateTime<Utc>>,
    thresholds: &ProgressionThresholds,
  ) -> (ProgressionAction, String) {
    if no_history {
      return (
        ProgressionAction::Progress,
        "No history yet, start the progression".to_string(),
      );
    }

    if failures >= thresholds.deload_after_failures {
      let success_since_deload = match (last_success, last_deload) {
        (Some(success), Some(deload)) => success >= deload,
        (Some(_), None) => true,
        (None, _) => false,
      };
      if total_deloads >= thresholds.reset_after_deloads && !success_since_deload {
        return (
          ProgressionAction::Reset,
          format!(
            "{} deloads with no success since the last one, resetting",
            total_deloads
          ),
        );
      }
      return (
        ProgressionAction::Deload,
        format!(
          "{} consecutive failures (deload at {})",
          failures, thresholds.deload_after_failures
        ),
      );
    }

    if failures > 0 {
      return (
        ProgressionAction::Maintain,
        format!(
          "{} consecutive failure{}, repeat the load",
          failures,
          if failures == 1 { "" } else { "s" }
        ),
      );
    }

    if success_streak >= thresholds.test_max_after_successes {
      return (
        ProgressionAction::Test1Rm,
        format!("{} successful sessions in a row, retest the max", success_streak),
      );
    }

    (ProgressionAction::Progress, "Last session succeeded".to_string())
  }
}

// ---------------------------------------------------------------------------
/// History grouping
// ---------------------------------------------------------------------------

/// Key identifying one progression track
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExerciseKey {
  pub programme_id: String,
  pub exercise_name: String,
}

/// Split a mixed log into per-exercise histories, each sorted newest-first.
/// Records on the same date keep their input order.
pub fn group_by_exercise(records: &[TrainingRecord]) -> BTreeMap<ExerciseKey, Vec<TrainingRecord>> {
  let mut grouped: BTreeMap<ExerciseKey, Vec<TrainingRecord>> = BTreeMap::new();
  for record in records {
    grouped
      .entry(ExerciseKey {
        programme_id: record.programme_id.clone(),
        exercise_name: record.exercise_name.clone(),
      })
      .or_default()
      .push(record.clone());
  }
  for history in grouped.values_mut() {
    history.sort_by(|a, b| b.workout_date.cmp(&a.workout_date));
  }
  grouped
}

/// Status for every exercise in a mixed log
pub fn compute_all(
  records: &[TrainingRecord],
  thresholds: &ProgressionThresholds,
) -> BTreeMap<ExerciseKey, ProgressionStatus> {
  group_by_exercise(records)
    .into_iter()
    .map(|(key, history)| {
      let status = ProgressionStatus::compute(&history, thresholds);
      (key, status)
    })
    .collect()
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{mock_training_record, Outcome};
  use Outcome::{Deload, DeloadFailed, Fail, Success};

  /// Build newest-first history from outcomes listed oldest to newest
  fn history(outcomes_oldest_first: &[Outcome]) -> Vec<TrainingRecord> {
    let len = outcomes_oldest_first.len() as i64;
    let mut records: Vec<TrainingRecord> = outcomes_oldest_first
      .iter()
      .enumerate()
      .map(|(i, outcome)| mock_training_record("squat", *outcome, (len - i as i64) * 2))
      .collect();
    records.reverse();
    records
  }

  #[test]
  fn test_success_then_three_failures() {
    assert_eq!(consecutive_failures(&history(&[Success, Fail, Fail, Fail])), 3);
  }

  #[test]
  fn test_failures_then_success() {
    assert_eq!(consecutive_failures(&history(&[Fail, Fail, Success])), 0);
  }

  #[test]
  fn test_deload_resets_count() {
    assert_eq!(consecutive_failures(&history(&[Fail, Fail, DeloadFailed, Fail])), 1);
  }

  #[test]
  fn test_successful_deload_resets_count() {
    assert_eq!(consecutive_failures(&history(&[Fail, Fail, Deload])), 0);
  }

  #[test]
  fn test_no_boundary_counts_everything() {
    assert_eq!(consecutive_failures(&history(&[Fail, Fail, Fail, Fail])), 4);
    assert_eq!(consecutive_failures(&[]), 0);
  }

  #[test]
  fn test_status_empty_history_progresses() {
    let status = ProgressionStatus::compute(&[], &ProgressionThresholds::default());
    assert_eq!(status.suggested_action, ProgressionAction::Progress);
    assert_eq!(status.consecutive_failures, 0);
    assert_eq!(status.last_success_date, None);
    assert!(!status.is_in_deload_cycle);
  }

  #[test]
  fn test_status_after_success_progresses() {
    let status = ProgressionStatus::compute(
      &history(&[Fail, Success]),
      &ProgressionThresholds::default(),
    );
    assert_eq!(status.suggested_action, ProgressionAction::Progress);
    assert_eq!(status.success_streak, 1);
  }

  #[test]
  fn test_status_single_failure_maintains() {
    let status = ProgressionStatus::compute(
      &history(&[Success, Fail]),
      &ProgressionThresholds::default(),
    );
    assert_eq!(status.suggested_action, ProgressionAction::Maintain);
    assert!(status.reason.contains("1 consecutive failure,"));
  }

  #[test]
  fn test_status_three_failures_deloads() {
    let records = history(&[Success, Fail, Fail, Fail]);
    let status = ProgressionStatus::compute(&records, &ProgressionThresholds::default());
    assert_eq!(status.consecutive_failures, 3);
    assert_eq!(status.suggested_action, ProgressionAction::Deload);
    assert_eq!(status.last_success_date, Some(records[3].workout_date));
  }

  #[test]
  fn test_status_repeated_deloads_without_success_resets() {
    let records = history(&[
      Fail, Fail, Fail, DeloadFailed, Fail, Fail, Fail, DeloadFailed, Fail, Fail, Fail,
      DeloadFailed, Fail, Fail, Fail,
    ]);
    let status = ProgressionStatus::compute(&records, &ProgressionThresholds::default());
    assert_eq!(status.total_deloads, 3);
    assert_eq!(status.consecutive_failures, 3);
    assert_eq!(status.suggested_action, ProgressionAction::Reset);
  }

  #[test]
  fn test_status_deloads_with_recent_success_only_deload() {
    // Last deload succeeded, so the failures since then are a fresh stall
    let records = history(&[
      DeloadFailed, Fail, DeloadFailed, Fail, Deload, Fail, Fail, Fail,
    ]);
    let status = ProgressionStatus::compute(&records, &ProgressionThresholds::default());
    assert_eq!(status.total_deloads, 3);
    assert_eq!(status.suggested_action, ProgressionAction::Deload);
  }

  #[test]
  fn test_status_long_success_streak_tests_max() {
    let records = history(&[Success; 6]);
    let status = ProgressionStatus::compute(&records, &ProgressionThresholds::default());
    assert_eq!(status.success_streak, 6);
    assert_eq!(status.suggested_action, ProgressionAction::Test1Rm);
  }

  #[test]
  fn test_status_deload_cycle_flag_and_dates() {
    let records = history(&[Fail, Fail, Fail, Deload]);
    let status = ProgressionStatus::compute(&records, &ProgressionThresholds::default());
    assert!(status.is_in_deload_cycle);
    assert_eq!(status.last_deload_date, Some(records[0].workout_date));
    assert_eq!(status.last_success_date, Some(records[0].workout_date));
    assert_eq!(status.suggested_action, ProgressionAction::Progress);
  }

  #[test]
  fn test_custom_thresholds() {
    let thresholds = ProgressionThresholds {
      deload_after_failures: 2,
      ..ProgressionThresholds::default()
    };
    let status = ProgressionStatus::compute(&history(&[Success, Fail, Fail]), &thresholds);
    assert_eq!(status.suggested_action, ProgressionAction::Deload);
  }

  #[test]
  fn test_group_by_exercise_sorts_newest_first() {
    let mut records = vec![
      mock_training_record("squat", Success, 10),
      mock_training_record("bench", Fail, 3),
      mock_training_record("squat", Fail, 1),
      mock_training_record("squat", Fail, 5),
    ];
    records[1].programme_id = "prog-2".to_string();

    let grouped = group_by_exercise(&records);
    assert_eq!(grouped.len(), 2);

    let squat = &grouped[&ExerciseKey {
      programme_id: "prog-1".to_string(),
      exercise_name: "squat".to_string(),
    }];
    assert_eq!(squat.len(), 3);
    assert!(squat.windows(2).all(|w| w[0].workout_date >= w[1].workout_date));
    assert_eq!(consecutive_failures(squat), 2);
  }

  #[test]
  fn test_compute_all() {
    let records = vec![
      mock_training_record("squat", Fail, 1),
      mock_training_record("squat", Fail, 3),
      mock_training_record("squat", Fail, 5),
      mock_training_record("bench", Success, 2),
    ];
    let statuses = compute_all(&records, &ProgressionThresholds::default());
    let actions: Vec<ProgressionAction> = statuses.values().map(|s| s.suggested_action).collect();
    // BTreeMap order: bench before squat
    assert_eq!(actions, vec![ProgressionAction::Progress, ProgressionAction::Deload]);
  }

  #[test]
  fn test_action_string_roundtrip() {
    for action in [
      ProgressionAction::Progress,
      ProgressionAction::Maintain,
      ProgressionAction::Deload,
      ProgressionAction::Reset,
      ProgressionAction::Test1Rm,
    ] {
      assert_eq!(action.to_string().parse::<ProgressionAction>(), Ok(action));
      let json = serde_json::to_string(&action).unwrap();
      assert_eq!(json, format!("\"{}\"", action));
    }
  }
}
