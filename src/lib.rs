//! Training progression and exercise identity engine for a strength log.
//!
//! Pure, synchronous computations over caller-supplied data: set
//! prescription, progression decisions, personal record selection, voice
//! exercise matching and catalog sync conversion. Persistence, transport and
//! scheduling belong to the host application.

pub mod config;
pub mod error;
pub mod matcher;
pub mod models;
pub mod prescription;
pub mod progression;
pub mod records;
pub mod sync;
pub mod telemetry;

#[cfg(test)]
mod test_utils;

pub use config::{EngineConfig, ProgressionThresholds};
pub use error::{ConfigError, LifecycleError};
pub use matcher::{ExerciseMatch, ExerciseMatchResult, ExerciseMatcher};
pub use prescription::{calculate_weight, prescribe_exercise, resolve_reps};
pub use progression::{consecutive_failures, ProgressionAction, ProgressionStatus};
pub use records::{all_time_bests, detect_record, recent_prs, RecordSelector};
pub use sync::{from_remote, from_remote_at, plan_reconciliation, to_remote, SyncPlan};
pub use telemetry::init_tracing;

// Everything here is shared across threads by callers without locking.
const _: () = {
  const fn assert_send_sync<T: Send + Sync>() {}
  assert_send_sync::<EngineConfig>();
  assert_send_sync::<ExerciseMatcher>();
  assert_send_sync::<models::UserMaxes>();
  assert_send_sync::<models::ExerciseCatalogEntry>();
  assert_send_sync::<models::LocalExerciseBundle>();
  assert_send_sync::<models::RemoteExerciseDocument>();
  assert_send_sync::<models::PersonalRecord>();
  assert_send_sync::<models::TrainingRecord>();
};
