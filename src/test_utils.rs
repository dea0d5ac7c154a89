//! Test utilities and helpers shared by the module tests
//!
//! - in-memory store setup/teardown
//! - draft and entity factories

use crate::db;
use crate::models::{ExerciseKind, NewExercise, SessionType};
use crate::sessions::SessionDraft;
use crate::store::Store;

/// ---------------------------------------------------------------------------
/// Store Setup
/// ---------------------------------------------------------------------------

/// Fresh in-memory store with the schema provisioned.
pub async fn setup_test_store() -> Store {
  db::open_in_memory()
    .await
    .expect("failed to open in-memory store")
}

/// Close a test store's pool.
pub async fn teardown_test_store(store: Store) {
  store.close().await;
}

/// ---------------------------------------------------------------------------
/// Factories
/// ---------------------------------------------------------------------------

/// A new-session draft for the given date and type; one hour, no notes.
pub fn draft_session(date_iso: &str, session_type: SessionType) -> SessionDraft {
  SessionDraft {
    id: None,
    date_iso: date_iso.to_string(),
    session_type,
    duration_min: 60,
    notes: None,
    intensity: None,
    other_name: None,
  }
}

/// Catalog fields for a strength exercise in the given muscle group.
pub fn strength_exercise_fields(name: &str, group: &str) -> NewExercise {
  NewExercise {
    name: name.to_string(),
    group: group.to_string(),
    kind: ExerciseKind::Strength,
    primary: "Peitoral maior".to_string(),
    emphasis: "Ênfase geral".to_string(),
    secondary: "Tríceps".to_string(),
  }
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::Table;

  #[tokio::test]
  async fn test_setup_store_creates_schema() {
    let store = setup_test_store().await;

    for table in Table::ALL {
      let rows = store.get_all(table).await.expect("get_all failed");
      assert!(rows.is_empty());
    }

    teardown_test_store(store).await;
  }

  #[test]
  fn test_factories_create_valid_data() {
    let draft = draft_session("2026-03-05", SessionType::Gym);
    assert_eq!(draft.duration_min, 60);
    assert!(draft.id.is_none());

    let fields = strength_exercise_fields("Supino reto", "Peito");
    assert_eq!(fields.kind, ExerciseKind::Strength);
  }
}
