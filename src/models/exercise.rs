use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// ---------------------------------------------------------------------------
/// Catalog and voice entry
/// ---------------------------------------------------------------------------

/// Canonical exercise with the alternate names it is known by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseCatalogEntry {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub aliases: BTreeSet<String>,
}

impl ExerciseCatalogEntry {
  pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
      aliases: BTreeSet::new(),
    }
  }

  pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.aliases.extend(aliases.into_iter().map(Into::into));
    self
  }

  /// Canonical name followed by every alias
  pub fn names(&self) -> impl Iterator<Item = &str> {
    std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
  }
}

/// An exercise as it came out of voice transcription and NLU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceLoggedExercise {
  pub spoken_name: String,
  pub interpreted_name: String,
  pub matched_exercise_id: Option<String>,
  #[serde(default)]
  pub sets: Option<u32>,
  #[serde(default)]
  pub reps: Option<u32>,
  #[serde(default)]
  pub weight: Option<f64>,
}

impl VoiceLoggedExercise {
  pub fn new(spoken_name: impl Into<String>, interpreted_name: impl Into<String>) -> Self {
    Self {
      spoken_name: spoken_name.into(),
      interpreted_name: interpreted_name.into(),
      matched_exercise_id: None,
      sets: None,
      reps: None,
      weight: None,
    }
  }

  /// Unresolved exercises go to the disambiguation flow
  pub fn needs_mapping(&self) -> bool {
    self.matched_exercise_id.is_none()
  }
}

/// ---------------------------------------------------------------------------
/// Local enumerations
/// ---------------------------------------------------------------------------

/// Declares a closed enum whose wire form is SCREAMING_SNAKE_CASE and whose
/// lenient parser maps anything unrecognised to `$default`.
macro_rules! lenient_enum {
  (
    $(#[$meta:meta])*
    $name:ident default $default:ident {
      $($variant:ident => $text:literal),+ $(,)?
    }
  ) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum $name {
      $($variant),+
    }

    impl $name {
      pub const DEFAULT: Self = Self::$default;

      pub fn as_str(&self) -> &'static str {
        match self {
          $(Self::$variant => $text),+
        }
      }

      /// Strict parse of the wire form, case and separator insensitive
      pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
          $($text => Some(Self::$variant),)+
          _ => None,
        }
      }

      /// Parse, falling back to the documented default for unknown values
      pub fn parse_or_default(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|| {
          tracing::warn!(
            value = raw,
            fallback = Self::DEFAULT.as_str(),
            "Unrecognised {} value, using default",
            stringify!($name)
          );
          Self::DEFAULT
        })
      }
    }

    impl Default for $name {
      fn default() -> Self {
        Self::DEFAULT
      }
    }

    impl std::fmt::Display for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
      }
    }
  };
}

lenient_enum! {
  ExerciseCategory default FullBody {
    Chest => "CHEST",
    Back => "BACK",
    Legs => "LEGS",
    Shoulders => "SHOULDERS",
    Arms => "ARMS",
    Core => "CORE",
    Cardio => "CARDIO",
    FullBody => "FULL_BODY",
  }
}

lenient_enum! {
  MovementPattern default Push {
    Push => "PUSH",
    HorizontalPush => "HORIZONTAL_PUSH",
    VerticalPush => "VERTICAL_PUSH",
    Pull => "PULL",
    HorizontalPull => "HORIZONTAL_PULL",
    VerticalPull => "VERTICAL_PULL",
    Squat => "SQUAT",
    Hinge => "HINGE",
    Lunge => "LUNGE",
    Carry => "CARRY",
    Rotation => "ROTATION",
    Isometric => "ISOMETRIC",
  }
}

lenient_enum! {
  Equipment default None {
    Barbell => "BARBELL",
    Dumbbell => "DUMBBELL",
    Kettlebell => "KETTLEBELL",
    Cable => "CABLE",
    Machine => "MACHINE",
    SmithMachine => "SMITH_MACHINE",
    Band => "BAND",
    Bodyweight => "BODYWEIGHT",
    None => "NONE",
  }
}

lenient_enum! {
  Difficulty default Intermediate {
    Beginner => "BEGINNER",
    Intermediate => "INTERMEDIATE",
    Advanced => "ADVANCED",
  }
}

lenient_enum! {
  MuscleGroup default FullBody {
    Chest => "CHEST",
    Back => "BACK",
    Lats => "LATS",
    Traps => "TRAPS",
    Shoulders => "SHOULDERS",
    Biceps => "BICEPS",
    Triceps => "TRICEPS",
    Forearms => "FOREARMS",
    Abs => "ABS",
    Obliques => "OBLIQUES",
    LowerBack => "LOWER_BACK",
    Quads => "QUADS",
    Hamstrings => "HAMSTRINGS",
    Glutes => "GLUTES",
    Calves => "CALVES",
    Adductors => "ADDUCTORS",
    FullBody => "FULL_BODY",
  }
}

lenient_enum! {
  InstructionKind default Execution {
    Setup => "SETUP",
    Execution => "EXECUTION",
    Breathing => "BREATHING",
    CommonMistake => "COMMON_MISTAKE",
    Tip => "TIP",
    Safety => "SAFETY",
  }
}

/// ---------------------------------------------------------------------------
/// Local normalized entities
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseCore {
  pub id: String,
  /// Identifier of the remote document this core was derived from
  pub remote_id: String,
  pub name: String,
  pub category: ExerciseCategory,
  pub movement_pattern: MovementPattern,
  pub is_compound: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseVariation {
  pub id: String,
  pub core_id: String,
  pub name: String,
  pub equipment: Equipment,
  pub difficulty: Difficulty,
  pub description: Option<String>,
  pub rep_range_note: Option<String>,
  pub rest_seconds: Option<u32>,
  pub is_custom: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseMuscle {
  pub id: String,
  pub variation_id: String,
  pub muscle: MuscleGroup,
  pub is_primary: bool,
  /// Share of the work this muscle takes, 0.0..=1.0
  pub emphasis: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseAlias {
  pub id: String,
  pub variation_id: String,
  pub alias: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseInstruction {
  pub id: String,
  pub variation_id: String,
  pub kind: InstructionKind,
  pub order_index: u32,
  pub content: String,
}

/// One exercise split across the local tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalExerciseBundle {
  pub core: ExerciseCore,
  pub variation: ExerciseVariation,
  pub muscles: Vec<ExerciseMuscle>,
  pub aliases: Vec<ExerciseAlias>,
  pub instructions: Vec<ExerciseInstruction>,
}

/// ---------------------------------------------------------------------------
/// Remote denormalized document
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMuscle {
  pub muscle: String,
  #[serde(default)]
  pub is_primary: bool,
  /// `null` (how JSON writes a non-finite float) reads back as 0.0
  #[serde(default, deserialize_with = "null_as_zero")]
  pub emphasis: f64,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
  D: serde::Deserializer<'de>,
{
  Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteInstruction {
  pub kind: String,
  pub content: String,
}

/// One flat record embedding core, variation and child lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteExerciseDocument {
  pub id: String,
  pub core_name: String,
  pub category: String,
  pub movement_pattern: String,
  #[serde(default)]
  pub is_compound: bool,
  pub name: String,
  pub equipment: String,
  pub difficulty: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rep_range_note: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rest_seconds: Option<u32>,
  #[serde(default)]
  pub is_custom: bool,
  #[serde(default)]
  pub muscles: Vec<RemoteMuscle>,
  #[serde(default)]
  pub aliases: Vec<String>,
  /// In display order
  #[serde(default)]
  pub instructions: Vec<RemoteInstruction>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,
}

impl RemoteExerciseDocument {
  pub fn from_json(json: &str) -> Result<Self, String> {
    serde_json::from_str(json).map_err(|e| format!("Failed to parse exercise document: {}", e))
  }

  pub fn to_json(&self) -> Result<String, String> {
    serde_json::to_string(self).map_err(|e| format!("Failed to serialize exercise document: {}", e))
  }
}
