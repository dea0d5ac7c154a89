//! Exercise catalog operations
//!
//! User-added catalog entries and the suggestion query behind the muscle
//! group picker. Catalog rows are immutable once created and no core flow
//! deletes them; duplicate names are deliberately allowed.

use crate::models::{Exercise, NewExercise};
use crate::schema::Table;
use crate::sessions::DraftExercise;
use crate::store::{Store, StoreError};

/// Suggestions return at most this many exercises per muscle group.
pub const SUGGESTIONS_PER_GROUP: usize = 5;

/// Insert a user-added catalog entry and return it with its assigned id.
///
/// Names are not deduplicated. Blank descriptive fields fall back to a
/// placeholder so list views always have something to show.
pub async fn add_exercise(store: &Store, new: NewExercise) -> Result<Exercise, StoreError> {
  let exercise = Exercise {
    id: None,
    name: new.name.trim().to_string(),
    group: new.group,
    kind: new.kind,
    primary: placeholder(new.primary),
    emphasis: placeholder(new.emphasis),
    secondary: placeholder(new.secondary),
    built_in: false,
  };

  let id = store
    .add(Table::Exercises, &serde_json::to_value(&exercise)?)
    .await?
    .into_int(Table::Exercises)?;

  Ok(Exercise { id: Some(id), ..exercise })
}

fn placeholder(value: String) -> String {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    "—".to_string()
  } else {
    trimmed.to_string()
  }
}

/// Draft rows for the requested muscle groups: up to
/// [`SUGGESTIONS_PER_GROUP`] exercises per group, built-in entries first,
/// each pre-filled with the default detail for its kind.
pub async fn suggestions_for_groups(
  store: &Store,
  groups: &[String],
) -> Result<Vec<DraftExercise>, StoreError> {
  let mut rows = Vec::new();

  for group in groups {
    let mut exercises: Vec<Exercise> = store
      .get_all_by_index(Table::Exercises, "by_group", group.as_str())
      .await?
      .into_iter()
      .map(serde_json::from_value)
      .collect::<Result<_, _>>()?;

    // Built-ins first; the sort is stable, so catalog order holds within
    // each half.
    exercises.sort_by_key(|e| !e.built_in);

    rows.extend(
      exercises
        .into_iter()
        .take(SUGGESTIONS_PER_GROUP)
        .map(DraftExercise::for_exercise),
    );
  }

  Ok(rows)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::ExerciseKind;
  use crate::seed;
  use crate::test_utils::{setup_test_store, strength_exercise_fields};

  #[tokio::test]
  async fn test_add_exercise_defaults() {
    let store = setup_test_store().await;

    let exercise = add_exercise(
      &store,
      NewExercise {
        name: "  Remada unilateral  ".to_string(),
        group: "Costas".to_string(),
        kind: ExerciseKind::Strength,
        primary: String::new(),
        emphasis: "  ".to_string(),
        secondary: "Bíceps".to_string(),
      },
    )
    .await
    .expect("add_exercise failed");

    assert!(exercise.id.is_some());
    assert!(!exercise.built_in);
    assert_eq!(exercise.name, "Remada unilateral");
    assert_eq!(exercise.primary, "—");
    assert_eq!(exercise.emphasis, "—");
    assert_eq!(exercise.secondary, "Bíceps");
  }

  #[tokio::test]
  async fn test_duplicate_names_allowed() {
    let store = setup_test_store().await;

    for _ in 0..2 {
      add_exercise(&store, strength_exercise_fields("Supino reto", "Peito"))
        .await
        .expect("duplicate name must be accepted");
    }

    let by_name = store
      .get_all_by_index(Table::Exercises, "by_name", "Supino reto")
      .await
      .expect("index query failed");
    assert_eq!(by_name.len(), 2);
  }

  #[tokio::test]
  async fn test_suggestions_limit_and_builtin_first() {
    let store = setup_test_store().await;
    seed::ensure_seed(&store).await.expect("seed failed");

    // A user-added chest exercise must sort after the five built-ins and
    // therefore never make the cut.
    add_exercise(&store, strength_exercise_fields("Supino com corrente", "Peito"))
      .await
      .expect("add_exercise failed");

    let rows = suggestions_for_groups(&store, &["Peito".to_string(), "Cardio".to_string()])
      .await
      .expect("suggestions failed");

    assert_eq!(rows.len(), 2 * SUGGESTIONS_PER_GROUP);
    assert!(rows
      .iter()
      .all(|r| r.exercise.as_ref().map(|e| e.built_in).unwrap_or(false)));

    // Strength suggestions come with one default set, cardio ones with
    // default cardio detail.
    let chest = &rows[0];
    assert_eq!(chest.sets.len(), 1);
    assert!(chest.cardio.is_none());
    let cardio = &rows[SUGGESTIONS_PER_GROUP];
    assert!(cardio.sets.is_empty());
    assert!(cardio.cardio.is_some());
  }

  #[tokio::test]
  async fn test_suggestions_for_unknown_group_are_empty() {
    let store = setup_test_store().await;

    let rows = suggestions_for_groups(&store, &["Antebraço".to_string()])
      .await
      .expect("suggestions failed");
    assert!(rows.is_empty());
  }
}
