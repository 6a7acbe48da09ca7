use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One logged attempt against a `(programme_id, exercise_name)` pair.
/// Never mutated after it is logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
  pub programme_id: String,
  pub exercise_name: String,
  pub target_weight: f64,
  pub achieved_weight: f64,
  pub target_reps: u32,
  pub achieved_reps: u32,
  pub completed_sets: u32,
  pub target_sets: u32,
  pub was_successful: bool,
  pub is_deload_workout: bool,
  pub workout_date: DateTime<Utc>,
}

impl TrainingRecord {
  /// Whether this record ends a failure streak when scanning newest-first
  pub fn is_reset_boundary(&self) -> bool {
    self.was_successful || self.is_deload_workout
  }
}

// ---------------------------------------------------------------------------
/// One-rep max estimation formulas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OneRmFormula {
  #[default]
  Epley,
  Brzycki,
  Lombardi,
  OConner,
}

impl OneRmFormula {
  /// Estimate the one-rep max for `weight` lifted for `reps`.
  /// A single rep is its own max; zero reps estimate nothing.
  pub fn estimate(&self, weight: f64, reps: u32) -> f64 {
    if reps == 0 {
      return 0.0;
    }
    if reps == 1 {
      return weight;
    }
    let r = reps as f64;
    match self {
      Self::Epley => weight * (1.0 + r / 30.0),
      Self::Brzycki => {
        let denominator = 1.0278 - 0.0278 * r;
        if denominator > 0.0 {
          weight / denominator
        } else {
          Self::Epley.estimate(weight, reps)
        }
      }
      Self::Lombardi => weight * r.powf(0.10),
      Self::OConner => weight * (1.0 + 0.025 * r),
    }
  }
}

impl std::fmt::Display for OneRmFormula {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Epley => write!(f, "epley"),
      Self::Brzycki => write!(f, "brzycki"),
      Self::Lombardi => write!(f, "lombardi"),
      Self::OConner => write!(f, "oconner"),
    }
  }
}

impl FromStr for OneRmFormula {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "epley" => Ok(Self::Epley),
      "brzycki" => Ok(Self::Brzycki),
      "lombardi" => Ok(Self::Lombardi),
      "oconner" | "o'conner" => Ok(Self::OConner),
      _ => Err(format!("Unknown 1RM formula: {}", s)),
    }
  }
}

// ---------------------------------------------------------------------------
/// Personal Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
  Weight,
  Reps,
  Volume,
  EstimatedOneRm,
}

/// The best performance a new record is measured against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviousBest {
  pub weight: f64,
  pub reps: u32,
  pub date: DateTime<Utc>,
}

/// A personal record for one exercise.
///
/// `estimated_1rm`, `volume` and `improvement_percentage` are a snapshot
/// taken in [`PersonalRecord::new`]. Copies made with different weight or
/// reps keep the snapshot; they are never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
  pub exercise_id: String,
  pub weight: f64,
  pub reps: u32,
  pub record_date: DateTime<Utc>,
  pub previous_weight: Option<f64>,
  pub previous_reps: Option<u32>,
  pub previous_date: Option<DateTime<Utc>>,
  pub improvement_percentage: f64,
  pub kind: RecordKind,
  pub estimated_1rm: f64,
  pub volume: f64,
}

impl PersonalRecord {
  pub fn new(
    exercise_id: impl Into<String>,
    weight: f64,
    reps: u32,
    record_date: DateTime<Utc>,
    previous: Option<PreviousBest>,
    kind: RecordKind,
    formula: OneRmFormula,
  ) -> Self {
    let estimated_1rm = formula.estimate(weight, reps);
    let volume = weight * reps as f64;

    let improvement_percentage = previous
      .map(|prev| {
        let (current, before) = match kind {
          RecordKind::Weight => (weight, prev.weight),
          RecordKind::Reps => (reps as f64, prev.reps as f64),
          RecordKind::Volume => (volume, prev.weight * prev.reps as f64),
          RecordKind::EstimatedOneRm => (estimated_1rm, formula.estimate(prev.weight, prev.reps)),
        };
        percent_change(before, current)
      })
      .unwrap_or(0.0);

    Self {
      exercise_id: exercise_id.into(),
      weight,
      reps,
      record_date,
      previous_weight: previous.map(|p| p.weight),
      previous_reps: previous.map(|p| p.reps),
      previous_date: previous.map(|p| p.date),
      improvement_percentage,
      kind,
      estimated_1rm,
      volume,
    }
  }

  /// Copy with a different weight and rep count, keeping the snapshot fields
  pub fn with_weight_and_reps(&self, weight: f64, reps: u32) -> Self {
    Self {
      weight,
      reps,
      ..self.clone()
    }
  }

  pub fn is_first_record(&self) -> bool {
    self.previous_weight.is_none()
  }
}

fn percent_change(before: f64, current: f64) -> f64 {
  if before > 0.0 {
    (current - before) / before * 100.0
  } else {
    0.0
  }
}
