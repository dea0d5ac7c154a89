use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Exercise Kind
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
  Strength,
  Cardio,
}

impl std::fmt::Display for ExerciseKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Strength => write!(f, "strength"),
      Self::Cardio => write!(f, "cardio"),
    }
  }
}

impl std::str::FromStr for ExerciseKind {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "strength" => Ok(Self::Strength),
      "cardio" => Ok(Self::Cardio),
      _ => Err(format!("Unknown exercise kind: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Exercise
/// ---------------------------------------------------------------------------

/// A catalog entry: a strength movement or a cardio activity. Seeded rows
/// carry `built_in = true`; user-added rows never do. Catalog entries are
/// independent of sessions and are not deleted by any core flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  pub name: String,
  /// Muscle group, one of [`crate::seed::MUSCLE_GROUPS`].
  pub group: String,
  pub kind: ExerciseKind,
  /// Primary muscles worked.
  pub primary: String,
  /// What the movement emphasizes.
  pub emphasis: String,
  /// Secondary muscles worked.
  pub secondary: String,
  pub built_in: bool,
}

/// Fields for a user-added catalog entry; `built_in` is always false for
/// these.
#[derive(Debug, Clone)]
pub struct NewExercise {
  pub name: String,
  pub group: String,
  pub kind: ExerciseKind,
  pub primary: String,
  pub emphasis: String,
  pub secondary: String,
}
