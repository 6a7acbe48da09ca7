use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::LifecycleError;

// ---------------------------------------------------------------------------
/// Rep targets
// ---------------------------------------------------------------------------

/// Marker suffix on a per-set rep entry meaning "as many reps as possible"
pub const AMRAP_MARKER: char = '+';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepsSpec {
  /// Same rep count for every set: 5
  Single { reps: u32 },
  /// Bounded range: 8-12
  Range { min: u32, max: u32 },
  /// Unparsed range text as written in the programme: "8-12"
  RangeString { raw: String },
  /// One entry per set, optionally AMRAP: ["5", "3", "1+"]
  PerSet { sets: Vec<String> },
}

// ---------------------------------------------------------------------------
/// Lift keys and tested maxes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiftKey {
  Squat,
  Bench,
  Deadlift,
  Ohp,
}

impl LiftKey {
  /// Match a display name to a lift key by case-insensitive substring
  pub fn from_exercise_name(name: &str) -> Option<Self> {
    let lower = name.to_lowercase();
    if lower.contains("squat") {
      Some(Self::Squat)
    } else if lower.contains("bench") {
      Some(Self::Bench)
    } else if lower.contains("deadlift") {
      Some(Self::Deadlift)
    } else if lower.contains("overhead press") || lower.contains("ohp") {
      Some(Self::Ohp)
    } else {
      None
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Squat => "squat",
      Self::Bench => "bench",
      Self::Deadlift => "deadlift",
      Self::Ohp => "ohp",
    }
  }
}

/// Tested maxes keyed by lift
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserMaxes(HashMap<LiftKey, f64>);

impl UserMaxes {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, lift: LiftKey, max: f64) -> Self {
    self.0.insert(lift, max);
    self
  }

  pub fn set(&mut self, lift: LiftKey, max: f64) {
    self.0.insert(lift, max);
  }

  pub fn get(&self, lift: LiftKey) -> Option<f64> {
    self.0.get(&lift).copied()
  }

  /// Max for whichever lift the display name refers to
  pub fn for_exercise(&self, name: &str) -> Option<f64> {
    LiftKey::from_exercise_name(name).and_then(|lift| self.get(lift))
  }
}

impl FromIterator<(LiftKey, f64)> for UserMaxes {
  fn from_iter<I: IntoIterator<Item = (LiftKey, f64)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

// ---------------------------------------------------------------------------
/// Programme week specs and resolved sets
// ---------------------------------------------------------------------------

/// One exercise of a programme week, already typed by the programme parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgrammeExerciseSpec {
  pub name: String,
  pub sets: u32,
  pub reps: RepsSpec,
  /// Percent of tested max per set; shorter lists repeat their last entry
  #[serde(default)]
  pub intensity_per_set: Vec<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub progression: Option<String>,
}

impl ProgrammeExerciseSpec {
  pub fn intensity_for_set(&self, set_index: usize) -> Option<f64> {
    self
      .intensity_per_set
      .get(set_index)
      .or_else(|| self.intensity_per_set.last())
      .copied()
  }
}

/// Concrete target for one set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetPrescription {
  pub set_index: usize,
  pub weight: f64,
  pub reps: u32,
  pub is_amrap: bool,
  pub intensity: Option<f64>,
}

// ---------------------------------------------------------------------------
/// Programme lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgrammeStatus {
  NotStarted,
  InProgress,
  Completed,
  Cancelled,
}

impl std::fmt::Display for ProgrammeStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::NotStarted => write!(f, "NOT_STARTED"),
      Self::InProgress => write!(f, "IN_PROGRESS"),
      Self::Completed => write!(f, "COMPLETED"),
      Self::Cancelled => write!(f, "CANCELLED"),
    }
  }
}

impl std::str::FromStr for ProgrammeStatus {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "NOT_STARTED" => Ok(Self::NotStarted),
      "IN_PROGRESS" => Ok(Self::InProgress),
      "COMPLETED" => Ok(Self::Completed),
      "CANCELLED" => Ok(Self::Cancelled),
      _ => Err(format!("Unknown programme status: {}", s)),
    }
  }
}

/// Validated status/timestamp/active combination for a programme.
///
/// Only [`ProgrammeLifecycle::new`] and the transition methods build one,
/// so an inconsistent combination cannot be represented. Deserialization
/// goes through the same validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLifecycle")]
pub struct ProgrammeLifecycle {
  status: ProgrammeStatus,
  started_at: Option<DateTime<Utc>>,
  completed_at: Option<DateTime<Utc>>,
  is_active: bool,
}

#[derive(Deserialize)]
struct RawLifecycle {
  status: ProgrammeStatus,
  started_at: Option<DateTime<Utc>>,
  completed_at: Option<DateTime<Utc>>,
  is_active: bool,
}

impl TryFrom<RawLifecycle> for ProgrammeLifecycle {
  type Error = LifecycleError;
  fn try_from(raw: RawLifecycle) -> Result<Self, Self::Error> {
    Self::new(raw.status, raw.started_at, raw.completed_at, raw.is_active)
  }
}

impl ProgrammeLifecycle {
  pub fn new(
    status: ProgrammeStatus,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    is_active: bool,
  ) -> Result<Self, LifecycleError> {
    match status {
      ProgrammeStatus::NotStarted => {
        if started_at.is_some() {
          return Err(LifecycleError::UnexpectedStart(status));
        }
        if completed_at.is_some() {
          return Err(LifecycleError::UnexpectedCompletion(status));
        }
      }
      ProgrammeStatus::InProgress => {
        if started_at.is_none() {
          return Err(LifecycleError::MissingStart(status));
        }
        if completed_at.is_some() {
          return Err(LifecycleError::UnexpectedCompletion(status));
        }
      }
      ProgrammeStatus::Completed => {
        if completed_at.is_none() {
          return Err(LifecycleError::MissingCompletion(status));
        }
        if is_active {
          return Err(LifecycleError::ActiveNotAllowed(status));
        }
      }
      ProgrammeStatus::Cancelled => {
        if is_active {
          return Err(LifecycleError::ActiveNotAllowed(status));
        }
      }
    }

    if let (Some(start), Some(end)) = (started_at, completed_at) {
      if end < start {
        return Err(LifecycleError::CompletedBeforeStart);
      }
    }

    Ok(Self {
      status,
      started_at,
      completed_at,
      is_active,
    })
  }

  /// A programme that has not been started yet
  pub fn not_started() -> Self {
    Self {
      status: ProgrammeStatus::NotStarted,
      started_at: None,
      completed_at: None,
      is_active: false,
    }
  }

  pub fn status(&self) -> ProgrammeStatus {
    self.status
  }

  pub fn started_at(&self) -> Option<DateTime<Utc>> {
    self.started_at
  }

  pub fn completed_at(&self) -> Option<DateTime<Utc>> {
    self.completed_at
  }

  pub fn is_active(&self) -> bool {
    self.is_active
  }

  /// NOT_STARTED -> IN_PROGRESS, becoming the active programme
  pub fn start(&self, now: DateTime<Utc>) -> Result<Self, LifecycleError> {
    match self.status {
      ProgrammeStatus::NotStarted => Self::new(ProgrammeStatus::InProgress, Some(now), None, true),
      from => Err(LifecycleError::InvalidTransition {
        from,
        to: ProgrammeStatus::InProgress,
      }),
    }
  }

  /// IN_PROGRESS -> COMPLETED
  pub fn complete(&self, now: DateTime<Utc>) -> Result<Self, LifecycleError> {
    match self.status {
      ProgrammeStatus::InProgress => {
        Self::new(ProgrammeStatus::Completed, self.started_at, Some(now), false)
      }
      from => Err(LifecycleError::InvalidTransition {
        from,
        to: ProgrammeStatus::Completed,
      }),
    }
  }

  /// NOT_STARTED or IN_PROGRESS -> CANCELLED
  pub fn cancel(&self) -> Result<Self, LifecycleError> {
    match self.status {
      ProgrammeStatus::NotStarted | ProgrammeStatus::InProgress => {
        Self::new(ProgrammeStatus::Cancelled, self.started_at, None, false)
      }
      from => Err(LifecycleError::InvalidTransition {
        from,
        to: ProgrammeStatus::Cancelled,
      }),
    }
  }
}
