//! Voice exercise matching
//!
//! Resolves a transcribed exercise name to a catalog entry. An exact hit on a
//! canonical name or alias (case and whitespace insensitive) wins outright.
//! Otherwise every entry is scored and the best few come back as ordered
//! suggestions; a score above the auto-match threshold is also promoted to
//! the best match.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strsim::normalized_levenshtein;

use crate::config::EngineConfig;
use crate::models::{ExerciseCatalogEntry, VoiceLoggedExercise};

/// Edit-distance similarity is discounted so it never outranks a clean
/// substring hit of the same length
const EDIT_DISTANCE_WEIGHT: f64 = 0.95;

/// ---------------------------------------------------------------------------
/// Results
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseMatch {
  pub exercise_id: String,
  pub name: String,
  /// 0.0..=1.0, 1.0 for an exact hit
  pub score: f64,
  /// The canonical name or alias that produced the score
  pub matched_text: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExerciseMatchResult {
  pub best_match: Option<ExerciseMatch>,
  pub suggestions: Vec<ExerciseMatch>,
  /// The best match is safe to apply without asking the user
  pub auto_matched: bool,
}

impl ExerciseMatchResult {
  pub fn matched_exercise_id(&self) -> Option<&str> {
    if self.auto_matched {
      self.best_match.as_ref().map(|m| m.exercise_id.as_str())
    } else {
      None
    }
  }
}

/// ---------------------------------------------------------------------------
/// Matcher
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseMatcher {
  pub auto_match_threshold: f64,
  pub min_suggestion_score: f64,
  pub max_suggestions: usize,
}

impl Default for ExerciseMatcher {
  fn default() -> Self {
    Self::from_config(&EngineConfig::default())
  }
}

impl ExerciseMatcher {
  pub fn from_config(config: &EngineConfig) -> Self {
    Self {
      auto_match_threshold: config.auto_match_threshold,
      min_suggestion_score: config.min_suggestion_score,
      max_suggestions: config.max_suggestions,
    }
  }

  /// Match a spoken name and its NLU interpretation against `catalog`
  pub fn find_match(
    &self,
    spoken_name: &str,
    interpreted_name: &str,
    catalog: &[ExerciseCatalogEntry],
  ) -> ExerciseMatchResult {
    if let Some(hit) = exact_match(spoken_name, interpreted_name, catalog) {
      tracing::debug!(exercise = %hit.exercise_id, text = %hit.matched_text, "Exact exercise match");
      return ExerciseMatchResult {
        best_match: Some(hit),
        suggestions: Vec::new(),
        auto_matched: true,
      };
    }

    let queries: Vec<String> = [spoken_name, interpreted_name]
      .iter()
      .map(|q| fuzzy_normalize(q))
      .filter(|q| !q.is_empty())
      .collect();

    let mut scored: Vec<ExerciseMatch> = catalog
      .iter()
      .filter_map(|entry| score_entry(&queries, entry))
      .filter(|m| m.score >= self.min_suggestion_score)
      .collect();

    scored.sort_by(|a, b| {
      b.score
        .total_cmp(&a.score)
        .then_with(|| a.name.cmp(&b.name))
    });
    scored.truncate(self.max_suggestions);

    let best_match = scored
      .first()
      .filter(|top| top.score >= self.auto_match_threshold)
      .cloned();
    let auto_matched = best_match.is_some();

    tracing::debug!(
      spoken = spoken_name,
      interpreted = interpreted_name,
      suggestions = scored.len(),
      auto_matched,
      "Fuzzy exercise match"
    );

    ExerciseMatchResult {
      best_match,
      suggestions: scored,
      auto_matched,
    }
  }

  /// Resolve a voice-logged exercise, filling its id on an automatic match.
  /// Exercises left without an id report `needs_mapping()`.
  pub fn resolve(
    &self,
    exercise: &VoiceLoggedExercise,
    catalog: &[ExerciseCatalogEntry],
  ) -> (VoiceLoggedExercise, ExerciseMatchResult) {
    let result = self.find_match(&exercise.spoken_name, &exercise.interpreted_name, catalog);
    let resolved = VoiceLoggedExercise {
      matched_exercise_id: result.matched_exercise_id().map(str::to_string),
      ..exercise.clone()
    };
    if resolved.needs_mapping() {
      tracing::info!(spoken = %exercise.spoken_name, "Exercise needs manual mapping");
    }
    (resolved, result)
  }
}

/// ---------------------------------------------------------------------------
/// Exact matching
/// ---------------------------------------------------------------------------

/// Lowercase and collapse whitespace
fn exact_normalize(s: &str) -> String {
  s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Spoken name is tried before the interpreted one
fn exact_match(
  spoken_name: &str,
  interpreted_name: &str,
  catalog: &[ExerciseCatalogEntry],
) -> Option<ExerciseMatch> {
  [spoken_name, interpreted_name]
    .iter()
    .map(|q| exact_normalize(q))
    .filter(|q| !q.is_empty())
    .find_map(|query| {
      catalog.iter().find_map(|entry| {
        entry
          .names()
          .find(|name| exact_normalize(name) == query)
          .map(|name| ExerciseMatch {
            exercise_id: entry.id.clone(),
            name: entry.name.clone(),
            score: 1.0,
            matched_text: name.to_string(),
          })
      })
    })
}

/// ---------------------------------------------------------------------------
/// Fuzzy scoring
/// ---------------------------------------------------------------------------

/// Lowercase, punctuation to spaces, collapse whitespace
fn fuzzy_normalize(s: &str) -> String {
  let cleaned: String = s
    .chars()
    .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
    .collect();
  cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shared tokens over the larger token count
fn token_overlap(a: &str, b: &str) -> f64 {
  let a_tokens: HashSet<&str> = a.split(' ').collect();
  let b_tokens: HashSet<&str> = b.split(' ').collect();
  let larger = a_tokens.len().max(b_tokens.len());
  if larger == 0 {
    return 0.0;
  }
  a_tokens.intersection(&b_tokens).count() as f64 / larger as f64
}

/// One string inside the other, scaled by how much of the longer it covers
fn containment(a: &str, b: &str) -> f64 {
  let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
  if shorter.is_empty() || !longer.contains(shorter) {
    return 0.0;
  }
  0.5 + 0.5 * (shorter.len() as f64 / longer.len() as f64)
}

/// Similarity of two normalized strings, 0.0..=1.0
pub fn similarity(a: &str, b: &str) -> f64 {
  if a == b {
    return 1.0;
  }
  token_overlap(a, b)
    .max(containment(a, b))
    .max(normalized_levenshtein(a, b) * EDIT_DISTANCE_WEIGHT)
}

/// Best score for `entry` over every query and every name it is known by
fn score_entry(queries: &[String], entry: &ExerciseCatalogEntry) -> Option<ExerciseMatch> {
  entry
    .names()
    .flat_map(|name| {
      let normalized = fuzzy_normalize(name);
      queries
        .iter()
        .map(move |query| (name, similarity(query, &normalized)))
    })
    .max_by(|a, b| a.1.total_cmp(&b.1))
    .map(|(name, score)| ExerciseMatch {
      exercise_id: entry.id.clone(),
      name: entry.name.clone(),
      score,
      matched_text: name.to_string(),
    })
}
