use serde::Serialize;

use crate::models::ProgrammeStatus;

/// ---------------------------------------------------------------------------
/// Lifecycle Errors
/// ---------------------------------------------------------------------------

/// Raised when a programme lifecycle value would be inconsistent.
/// Callers treat this as a programmer error, never as recoverable input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
  #[error("{0} programme must not have a start time")]
  UnexpectedStart(ProgrammeStatus),

  #[error("{0} programme requires a start time")]
  MissingStart(ProgrammeStatus),

  #[error("{0} programme must not have a completion time")]
  UnexpectedCompletion(ProgrammeStatus),

  #[error("{0} programme requires a completion time")]
  MissingCompletion(ProgrammeStatus),

  #[error("{0} programme cannot be flagged active")]
  ActiveNotAllowed(ProgrammeStatus),

  #[error("Completion time precedes start time")]
  CompletedBeforeStart,

  #[error("Cannot transition from {from} to {to}")]
  InvalidTransition {
    from: ProgrammeStatus,
    to: ProgrammeStatus,
  },
}

impl Serialize for LifecycleError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Configuration Errors
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid value for {key}: {value:?} ({reason})")]
  InvalidValue {
    key: String,
    value: String,
    reason: String,
  },
}

impl ConfigError {
  pub(crate) fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
    Self::InvalidValue {
      key: key.to_string(),
      value: value.to_string(),
      reason: reason.into(),
    }
  }
}

impl Serialize for ConfigError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}
