//! Engine configuration
//!
//! Every tunable the engine uses lives here as a plain value. Hosts either
//! take the defaults or load overrides from the environment (and a `.env`
//! file, when present) through [`EngineConfig::from_env`].

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::models::OneRmFormula;

/// ---------------------------------------------------------------------------
/// Configuration Keys
/// ---------------------------------------------------------------------------

pub const ROUNDING_INCREMENT_KEY: &str = "STRENGTH_ROUNDING_INCREMENT";
pub const RECENT_PR_DAYS_KEY: &str = "STRENGTH_RECENT_PR_DAYS";
pub const AUTO_MATCH_THRESHOLD_KEY: &str = "STRENGTH_AUTO_MATCH_THRESHOLD";
pub const MIN_SUGGESTION_SCORE_KEY: &str = "STRENGTH_MIN_SUGGESTION_SCORE";
pub const MAX_SUGGESTIONS_KEY: &str = "STRENGTH_MAX_SUGGESTIONS";
pub const DELOAD_AFTER_FAILURES_KEY: &str = "STRENGTH_DELOAD_AFTER_FAILURES";
pub const RESET_AFTER_DELOADS_KEY: &str = "STRENGTH_RESET_AFTER_DELOADS";
pub const TEST_MAX_AFTER_SUCCESSES_KEY: &str = "STRENGTH_TEST_MAX_AFTER_SUCCESSES";
pub const ONE_RM_FORMULA_KEY: &str = "STRENGTH_ONE_RM_FORMULA";

pub const DEFAULT_ROUNDING_INCREMENT: f64 = 2.5;
pub const DEFAULT_RECENT_PR_DAYS: i64 = 30;
/// Upper bound on the recent PR window, one hundred years
pub const MAX_RECENT_PR_DAYS: i64 = 36_500;

/// ---------------------------------------------------------------------------
/// Progression Thresholds
/// ---------------------------------------------------------------------------

/// Thresholds feeding the progression decision function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionThresholds {
  /// Consecutive failures that trigger a deload
  pub deload_after_failures: u32,
  /// Total deloads (with no success since the last one) that trigger a reset
  pub reset_after_deloads: u32,
  /// Consecutive successful sessions before suggesting a max test
  pub test_max_after_successes: u32,
}

impl Default for ProgressionThresholds {
  fn default() -> Self {
    Self {
      deload_after_failures: 3,
      reset_after_deloads: 3,
      test_max_after_successes: 6,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Engine Config
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
  /// Plate increment that prescribed weights floor to
  pub rounding_increment: f64,
  /// Window for the "recent PRs" view
  pub recent_pr_window_days: i64,
  /// Fuzzy score at which a suggestion is promoted to an automatic match
  pub auto_match_threshold: f64,
  /// Fuzzy score below which an entry is not suggested at all
  pub min_suggestion_score: f64,
  pub max_suggestions: usize,
  pub progression: ProgressionThresholds,
  pub one_rm_formula: OneRmFormula,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      rounding_increment: DEFAULT_ROUNDING_INCREMENT,
      recent_pr_window_days: DEFAULT_RECENT_PR_DAYS,
      auto_match_threshold: 0.85,
      min_suggestion_score: 0.35,
      max_suggestions: 5,
      progression: ProgressionThresholds::default(),
      one_rm_formula: OneRmFormula::default(),
    }
  }
}

impl EngineConfig {
  /// Load configuration from the process environment, reading `.env` first.
  /// Missing keys keep their defaults; malformed values are rejected.
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();

    let defaults = Self::default();
    let config = Self {
      rounding_increment: read_var(ROUNDING_INCREMENT_KEY, defaults.rounding_increment)?,
      recent_pr_window_days: read_var(RECENT_PR_DAYS_KEY, defaults.recent_pr_window_days)?,
      auto_match_threshold: read_var(AUTO_MATCH_THRESHOLD_KEY, defaults.auto_match_threshold)?,
      min_suggestion_score: read_var(MIN_SUGGESTION_SCORE_KEY, defaults.min_suggestion_score)?,
      max_suggestions: read_var(MAX_SUGGESTIONS_KEY, defaults.max_suggestions)?,
      progression: ProgressionThresholds {
        deload_after_failures: read_var(
          DELOAD_AFTER_FAILURES_KEY,
          defaults.progression.deload_after_failures,
        )?,
        reset_after_deloads: read_var(
          RESET_AFTER_DELOADS_KEY,
          defaults.progression.reset_after_deloads,
        )?,
        test_max_after_successes: read_var(
          TEST_MAX_AFTER_SUCCESSES_KEY,
          defaults.progression.test_max_after_successes,
        )?,
      },
      one_rm_formula: read_var(ONE_RM_FORMULA_KEY, defaults.one_rm_formula)?,
    };

    config.validate()?;
    tracing::debug!(?config, "Loaded engine config");
    Ok(config)
  }

  /// Check ranges that the type system cannot express
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.rounding_increment.is_nan() || self.rounding_increment <= 0.0 {
      return Err(ConfigError::invalid(
        ROUNDING_INCREMENT_KEY,
        &self.rounding_increment.to_string(),
        "must be greater than zero",
      ));
    }
    if self.recent_pr_window_days <= 0 {
      return Err(ConfigError::invalid(
        RECENT_PR_DAYS_KEY,
        &self.recent_pr_window_days.to_string(),
        "must be greater than zero",
      ));
    }
    if self.recent_pr_window_days > MAX_RECENT_PR_DAYS {
      return Err(ConfigError::invalid(
        RECENT_PR_DAYS_KEY,
        &self.recent_pr_window_days.to_string(),
        format!("must be at most {}", MAX_RECENT_PR_DAYS),
      ));
    }
    for (key, value) in [
      (AUTO_MATCH_THRESHOLD_KEY, self.auto_match_threshold),
      (MIN_SUGGESTION_SCORE_KEY, self.min_suggestion_score),
    ] {
      if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(key, &value.to_string(), "must be between 0 and 1"));
      }
    }
    for (key, value) in [
      (DELOAD_AFTER_FAILURES_KEY, self.progression.deload_after_failures),
      (RESET_AFTER_DELOADS_KEY, self.progression.reset_after_deloads),
      (TEST_MAX_AFTER_SUCCESSES_KEY, self.progression.test_max_after_successes),
    ] {
      if value == 0 {
        return Err(ConfigError::invalid(key, "0", "must be greater than zero"));
      }
    }
    Ok(())
  }
}

fn read_var<T>(key: &str, default: T) -> Result<T, ConfigError>
where
  T: FromStr,
{
  match env::var(key) {
    Ok(raw) if raw.trim().is_empty() => Ok(default),
    Ok(raw) => raw
      .trim()
      .parse()
      .map_err(|_| ConfigError::invalid(key, &raw, "could not be parsed")),
    Err(_) => Ok(default),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  fn test_defaults_are_valid() {
    let config = EngineConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.rounding_increment, 2.5);
    assert_eq!(config.recent_pr_window_days, 30);
    assert_eq!(config.progression.deload_after_failures, 3);
  }

  #[test]
  #[serial]
  fn test_from_env_without_overrides_uses_defaults() {
    temp_env::with_vars_unset(
      [
        ROUNDING_INCREMENT_KEY,
        RECENT_PR_DAYS_KEY,
        MAX_SUGGESTIONS_KEY,
        ONE_RM_FORMULA_KEY,
      ],
      || {
        let config = EngineConfig::from_env().expect("defaults should load");
        assert_eq!(config.rounding_increment, DEFAULT_ROUNDING_INCREMENT);
        assert_eq!(config.recent_pr_window_days, DEFAULT_RECENT_PR_DAYS);
        assert_eq!(config.one_rm_formula, OneRmFormula::Epley);
      },
    );
  }

  #[test]
  #[serial]
  fn test_from_env_reads_overrides() {
    temp_env::with_vars(
      [
        (ROUNDING_INCREMENT_KEY, Some("5")),
        (RECENT_PR_DAYS_KEY, Some("14")),
        (DELOAD_AFTER_FAILURES_KEY, Some("2")),
        (ONE_RM_FORMULA_KEY, Some("brzycki")),
      ],
      || {
        let config = EngineConfig::from_env().expect("overrides should load");
        assert_eq!(config.rounding_increment, 5.0);
        assert_eq!(config.recent_pr_window_days, 14);
        assert_eq!(config.progression.deload_after_failures, 2);
        assert_eq!(config.one_rm_formula, OneRmFormula::Brzycki);
      },
    );
  }

  #[test]
  #[serial]
  fn test_from_env_rejects_unparsable_value() {
    temp_env::with_var(MAX_SUGGESTIONS_KEY, Some("lots"), || {
      let err = EngineConfig::from_env().unwrap_err();
      assert!(err.to_string().contains(MAX_SUGGESTIONS_KEY));
    });
  }

  #[test]
  #[serial]
  fn test_from_env_rejects_non_positive_increment() {
    temp_env::with_var(ROUNDING_INCREMENT_KEY, Some("0"), || {
      let err = EngineConfig::from_env().unwrap_err();
      assert!(err.to_string().contains("greater than zero"));
    });
  }

  #[test]
  #[serial]
  fn test_from_env_rejects_oversized_window() {
    temp_env::with_var(RECENT_PR_DAYS_KEY, Some("1000000000000"), || {
      let err = EngineConfig::from_env().unwrap_err();
      assert!(err.to_string().contains("at most"));
    });
  }

  #[test]
  fn test_validate_accepts_max_window() {
    let config = EngineConfig {
      recent_pr_window_days: MAX_RECENT_PR_DAYS,
      ..EngineConfig::default()
    };
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_validate_rejects_threshold_out_of_range() {
    let config = EngineConfig {
      auto_match_threshold: 1.5,
      ..EngineConfig::default()
    };
    assert!(config.validate().is_err());
  }
}
