pub mod exercise;
pub mod programme;
pub mod workout;

pub use exercise::{
  Difficulty, Equipment, ExerciseAlias, ExerciseCatalogEntry, ExerciseCategory, ExerciseCore,
  ExerciseInstruction, ExerciseMuscle, ExerciseVariation, InstructionKind, LocalExerciseBundle,
  MovementPattern, MuscleGroup, RemoteExerciseDocument, RemoteInstruction, RemoteMuscle,
  VoiceLoggedExercise,
};
pub use programme::{
  LiftKey, ProgrammeExerciseSpec, ProgrammeLifecycle, ProgrammeStatus, RepsSpec, SetPrescription,
  UserMaxes, AMRAP_MARKER,
};
pub use workout::{OneRmFormula, PersonalRecord, PreviousBest, RecordKind, TrainingRecord};
