//! Exercise catalog sync conversion
//!
//! The remote store keeps one flat document per exercise; locally the same
//! exercise is split into core, variation, muscle, alias and instruction
//! rows. This module converts between the two.
//!
//! Local ids are derived, never random: each is a UUID v5 of the remote
//! document id plus the row's role (`core`, `variation`, `muscle:0`, ...).
//! Converting the same document twice therefore yields the same rows, which
//! is what keeps re-sync from duplicating them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::models::{
  Difficulty, Equipment, ExerciseAlias, ExerciseCategory, ExerciseCore, ExerciseInstruction,
  ExerciseMuscle, ExerciseVariation, InstructionKind, LocalExerciseBundle, MovementPattern,
  MuscleGroup, RemoteExerciseDocument, RemoteInstruction, RemoteMuscle,
};

/// Namespace for every id this module derives
pub const SYNC_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_8d3b_5c7a_9e0f_1b2d_3c4e_5f60);

/// ---------------------------------------------------------------------------
/// Identity
/// ---------------------------------------------------------------------------

/// Role a local row plays within one exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRole {
  Core,
  Variation,
  Muscle(usize),
  Alias(usize),
  Instruction(usize),
}

impl std::fmt::Display for EntityRole {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Core => write!(f, "core"),
      Self::Variation => write!(f, "variation"),
      Self::Muscle(i) => write!(f, "muscle:{}", i),
      Self::Alias(i) => write!(f, "alias:{}", i),
      Self::Instruction(i) => write!(f, "instruction:{}", i),
    }
  }
}

/// Stable local id for the row playing `role` in the exercise `remote_id`
pub fn local_id(remote_id: &str, role: EntityRole) -> String {
  let name = format!("{}:{}", remote_id, role);
  Uuid::new_v5(&SYNC_NAMESPACE, name.as_bytes()).to_string()
}

/// Non-finite emphasis has no JSON form; it converts as 0.0. Finite values,
/// in range or not, pass through untouched.
fn finite_emphasis(remote_id: &str, emphasis: f64) -> f64 {
  if emphasis.is_finite() {
    emphasis
  } else {
    tracing::warn!(remote_id, value = %emphasis, "Non-finite muscle emphasis, using 0.0");
    0.0
  }
}

/// ---------------------------------------------------------------------------
/// Remote -> Local
/// ---------------------------------------------------------------------------

/// Convert a remote document, stamping a missing creation time with the
/// current clock
pub fn from_remote(doc: &RemoteExerciseDocument) -> LocalExerciseBundle {
  from_remote_at(doc, Utc::now())
}

/// Convert a remote document; `now` stands in for a missing creation time
pub fn from_remote_at(doc: &RemoteExerciseDocument, now: DateTime<Utc>) -> LocalExerciseBundle {
  let core_id = local_id(&doc.id, EntityRole::Core);
  let variation_id = local_id(&doc.id, EntityRole::Variation);

  let core = ExerciseCore {
    id: core_id.clone(),
    remote_id: doc.id.clone(),
    name: doc.core_name.clone(),
    category: ExerciseCategory::parse_or_default(&doc.category),
    movement_pattern: MovementPattern::parse_or_default(&doc.movement_pattern),
    is_compound: doc.is_compound,
    created_at: doc.created_at.unwrap_or(now),
    updated_at: doc.updated_at,
  };

  let variation = ExerciseVariation {
    id: variation_id.clone(),
    core_id,
    name: doc.name.clone(),
    equipment: Equipment::parse_or_default(&doc.equipment),
    difficulty: Difficulty::parse_or_default(&doc.difficulty),
    description: doc.description.clone(),
    rep_range_note: doc.rep_range_note.clone(),
    rest_seconds: doc.rest_seconds,
    is_custom: doc.is_custom,
  };

  let muscles = doc
    .muscles
    .iter()
    .enumerate()
    .map(|(i, m)| ExerciseMuscle {
      id: local_id(&doc.id, EntityRole::Muscle(i)),
      variation_id: variation_id.clone(),
      muscle: MuscleGroup::parse_or_default(&m.muscle),
      is_primary: m.is_primary,
      emphasis: finite_emphasis(&doc.id, m.emphasis),
    })
    .collect();

  let aliases = doc
    .aliases
    .iter()
    .enumerate()
    .map(|(i, alias)| ExerciseAlias {
      id: local_id(&doc.id, EntityRole::Alias(i)),
      variation_id: variation_id.clone(),
      alias: alias.clone(),
    })
    .collect();

  let instructions = doc
    .instructions
    .iter()
    .enumerate()
    .map(|(i, instruction)| ExerciseInstruction {
      id: local_id(&doc.id, EntityRole::Instruction(i)),
      variation_id: variation_id.clone(),
      kind: InstructionKind::parse_or_default(&instruction.kind),
      order_index: i as u32,
      content: instruction.content.clone(),
    })
    .collect();

  tracing::debug!(remote_id = %doc.id, "Converted remote exercise document");

  LocalExerciseBundle {
    core,
    variation,
    muscles,
    aliases,
    instructions,
  }
}

/// ---------------------------------------------------------------------------
/// Local -> Remote
/// ---------------------------------------------------------------------------

/// Flatten a local bundle. Instructions are emitted by `order_index`.
pub fn to_remote(bundle: &LocalExerciseBundle) -> RemoteExerciseDocument {
  let mut instructions: Vec<&ExerciseInstruction> = bundle.instructions.iter().collect();
  instructions.sort_by_key(|i| i.order_index);

  RemoteExerciseDocument {
    id: bundle.core.remote_id.clone(),
    core_name: bundle.core.name.clone(),
    category: bundle.core.category.as_str().to_string(),
    movement_pattern: bundle.core.movement_pattern.as_str().to_string(),
    is_compound: bundle.core.is_compound,
    name: bundle.variation.name.clone(),
    equipment: bundle.variation.equipment.as_str().to_string(),
    difficulty: bundle.variation.difficulty.as_str().to_string(),
    description: bundle.variation.description.clone(),
    rep_range_note: bundle.variation.rep_range_note.clone(),
    rest_seconds: bundle.variation.rest_seconds,
    is_custom: bundle.variation.is_custom,
    muscles: bundle
      .muscles
      .iter()
      .map(|m| RemoteMuscle {
        muscle: m.muscle.as_str().to_string(),
        is_primary: m.is_primary,
        emphasis: finite_emphasis(&bundle.core.remote_id, m.emphasis),
      })
      .collect(),
    aliases: bundle.aliases.iter().map(|a| a.alias.clone()).collect(),
    instructions: instructions
      .into_iter()
      .map(|i| RemoteInstruction {
        kind: i.kind.as_str().to_string(),
        content: i.content.clone(),
      })
      .collect(),
    created_at: Some(bundle.core.created_at),
    updated_at: bundle.core.updated_at,
  }
}

/// ---------------------------------------------------------------------------
/// Reconciliation
/// ---------------------------------------------------------------------------

/// What a sync pass has to write on each side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncPlan {
  /// Remote documents with no local rows yet
  pub insert_local: Vec<LocalExerciseBundle>,
  /// Remote documents newer than their local rows
  pub update_local: Vec<LocalExerciseBundle>,
  /// Local bundles missing remotely or newer than the remote document
  pub upload: Vec<RemoteExerciseDocument>,
  pub unchanged: usize,
}

fn last_modified_local(bundle: &LocalExerciseBundle) -> DateTime<Utc> {
  bundle.core.updated_at.unwrap_or(bundle.core.created_at)
}

fn last_modified_remote(doc: &RemoteExerciseDocument) -> Option<DateTime<Utc>> {
  doc.updated_at.or(doc.created_at)
}

/// Pair local bundles with remote documents by remote id and decide which
/// side is stale. A remote document with no timestamps never overwrites
/// existing local rows.
pub fn plan_reconciliation(
  local: &[LocalExerciseBundle],
  remote: &[RemoteExerciseDocument],
  now: DateTime<Utc>,
) -> SyncPlan {
  let local_by_remote_id: HashMap<&str, &LocalExerciseBundle> = local
    .iter()
    .map(|b| (b.core.remote_id.as_str(), b))
    .collect();
  let remote_ids: HashSet<&str> = remote.iter().map(|d| d.id.as_str()).collect();

  let mut plan = SyncPlan::default();

  for doc in remote {
    match local_by_remote_id.get(doc.id.as_str()) {
      None => plan.insert_local.push(from_remote_at(doc, now)),
      Some(bundle) => {
        let local_modified = last_modified_local(bundle);
        match last_modified_remote(doc) {
          Some(remote_modified) if remote_modified > local_modified => {
            plan.update_local.push(from_remote_at(doc, now));
          }
          Some(remote_modified) if remote_modified < local_modified => {
            plan.upload.push(to_remote(bundle));
          }
          _ => plan.unchanged += 1,
        }
      }
    }
  }

  for bundle in local {
    if !remote_ids.contains(bundle.core.remote_id.as_str()) {
      plan.upload.push(to_remote(bundle));
    }
  }

  tracing::info!(
    insert_local = plan.insert_local.len(),
    update_local = plan.update_local.len(),
    upload = plan.upload.len(),
    unchanged = plan.unchanged,
    "Planned exercise catalog sync"
  );
  plan
}
