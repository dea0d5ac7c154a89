//! Whole-store snapshot portability
//!
//! Export produces a versioned document holding a full unfiltered dump of
//! every table; import is a destructive full replace that clears the store
//! and re-inserts the document's records with their original keys. Both
//! bypass the repository rules and work on raw documents, so a snapshot
//! round-trips byte-for-byte even if its records carry fields this build
//! does not know about.
//!
//! Import parses and shape-checks before touching the store, and the
//! clear-and-reinsert runs in one transaction: a failing import never
//! leaves the store partially cleared.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::Table;
use crate::seed;
use crate::store::{self, Store, StoreError};

/// Document version written by [`export`].
pub const BACKUP_VERSION: i64 = 1;

/// ---------------------------------------------------------------------------
/// Document Format
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
  #[serde(default)]
  pub version: i64,
  #[serde(default, rename = "exportedAt")]
  pub exported_at: String,
  pub data: BackupData,
}

/// Raw table dumps. Missing arrays deserialize as empty so older or
/// hand-trimmed documents still import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
  #[serde(default)]
  pub sessions: Vec<Value>,
  #[serde(default)]
  pub exercises: Vec<Value>,
  #[serde(default)]
  pub session_exercises: Vec<Value>,
  #[serde(default)]
  pub sets: Vec<Value>,
  #[serde(default)]
  pub cardio: Vec<Value>,
  #[serde(default)]
  pub meta: Vec<Value>,
}

impl Backup {
  /// Parse a backup document, rejecting anything without the expected
  /// top-level shape. The store is not involved; a failed parse changes
  /// nothing.
  pub fn parse(text: &str) -> Result<Self, StoreError> {
    serde_json::from_str(text).map_err(|e| StoreError::InvalidFormat(e.to_string()))
  }

  pub fn to_json(&self) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(self)?)
  }
}

/// ---------------------------------------------------------------------------
/// Export / Import
/// ---------------------------------------------------------------------------

/// Dump every table into a portable document.
pub async fn export(store: &Store) -> Result<Backup, StoreError> {
  let backup = Backup {
    version: BACKUP_VERSION,
    exported_at: Utc::now().to_rfc3339(),
    data: BackupData {
      sessions: store.get_all(Table::Sessions).await?,
      exercises: store.get_all(Table::Exercises).await?,
      session_exercises: store.get_all(Table::SessionExercises).await?,
      sets: store.get_all(Table::Sets).await?,
      cardio: store.get_all(Table::Cardio).await?,
      meta: store.get_all(Table::Meta).await?,
    },
  };

  tracing::info!(sessions = backup.data.sessions.len(), "store exported");
  Ok(backup)
}

/// Replace the entire store with the document's records, preserving their
/// primary keys. Everything not in the document is gone afterwards.
pub async fn import(store: &Store, backup: &Backup) -> Result<(), StoreError> {
  let mut tx = store.begin().await?;

  store::clear_all_in(&mut tx).await?;

  // Dependency order: parents before children.
  let batches: [(Table, &[Value]); 6] = [
    (Table::Meta, &backup.data.meta),
    (Table::Exercises, &backup.data.exercises),
    (Table::Sessions, &backup.data.sessions),
    (Table::SessionExercises, &backup.data.session_exercises),
    (Table::Sets, &backup.data.sets),
    (Table::Cardio, &backup.data.cardio),
  ];
  for (table, records) in batches {
    for record in records {
      store::put_in(&mut *tx, table, record).await?;
    }
  }

  tx.commit().await?;
  tracing::info!(sessions = backup.data.sessions.len(), "store replaced from backup");
  Ok(())
}

/// Parse and import in one step, for callers holding the raw file text.
pub async fn import_json(store: &Store, text: &str) -> Result<(), StoreError> {
  let backup = Backup::parse(text)?;
  import(store, &backup).await
}

/// Wipe the store and restore the built-in exercise catalog.
pub async fn reset(store: &Store) -> Result<(), StoreError> {
  store.clear_all().await?;
  seed::ensure_seed(store).await?;
  tracing::info!("store reset to seed state");
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog;
  use crate::models::SessionType;
  use crate::sessions::{save_session, DraftExercise};
  use crate::test_utils::{draft_session, setup_test_store, strength_exercise_fields};

  async fn populate(store: &Store) {
    let bench = catalog::add_exercise(store, strength_exercise_fields("Supino reto", "Peito"))
      .await
      .expect("add_exercise failed");
    let treadmill = catalog::add_exercise(
      store,
      crate::models::NewExercise {
        name: "Esteira".to_string(),
        group: "Cardio".to_string(),
        kind: crate::models::ExerciseKind::Cardio,
        primary: "Cardiorrespiratório".to_string(),
        emphasis: "—".to_string(),
        secondary: "—".to_string(),
      },
    )
    .await
    .expect("add_exercise failed");

    save_session(
      store,
      &draft_session("2026-03-05", SessionType::Gym),
      &[DraftExercise::for_exercise(bench), DraftExercise::for_exercise(treadmill)],
    )
    .await
    .expect("save failed");

    save_session(store, &draft_session("2026-03-14", SessionType::Basketball), &[])
      .await
      .expect("save failed");

    store.meta_set("seed_v1", "1").await.expect("meta_set failed");
  }

  async fn dump_all(store: &Store) -> Vec<Vec<Value>> {
    let mut all = Vec::new();
    for table in Table::ALL {
      all.push(store.get_all(table).await.expect("get_all failed"));
    }
    all
  }

  #[tokio::test]
  async fn test_export_document_shape() {
    let store = setup_test_store().await;
    populate(&store).await;

    let backup = export(&store).await.expect("export failed");
    let doc = serde_json::to_value(&backup).expect("encode failed");

    assert_eq!(doc["version"], serde_json::json!(BACKUP_VERSION));
    assert!(doc["exportedAt"].as_str().is_some());
    for key in ["sessions", "exercises", "sessionExercises", "sets", "cardio", "meta"] {
      assert!(doc["data"][key].is_array(), "missing data.{}", key);
    }
    assert_eq!(doc["data"]["sessions"].as_array().map(Vec::len), Some(2));
  }

  #[tokio::test]
  async fn test_export_import_round_trip() {
    let store = setup_test_store().await;
    populate(&store).await;

    let backup = export(&store).await.expect("export failed");
    let before = dump_all(&store).await;

    // Drift the store, then restore the snapshot.
    crate::sessions::delete_session_cascade(&store, backup.data.sessions[0]["id"].as_i64().unwrap())
      .await
      .expect("cascade failed");
    catalog::add_exercise(&store, strength_exercise_fields("Remada baixa", "Costas"))
      .await
      .expect("add_exercise failed");

    let text = backup.to_json().expect("encode failed");
    import_json(&store, &text).await.expect("import failed");

    assert_eq!(dump_all(&store).await, before);
  }

  #[tokio::test]
  async fn test_import_preserves_primary_keys() {
    let store = setup_test_store().await;
    populate(&store).await;

    let backup = export(&store).await.expect("export failed");
    let session_ids: Vec<i64> =
      backup.data.sessions.iter().filter_map(|s| s["id"].as_i64()).collect();

    import(&store, &backup).await.expect("import failed");

    for id in session_ids {
      assert!(store
        .get(Table::Sessions, id)
        .await
        .expect("get failed")
        .is_some());
    }
  }

  #[tokio::test]
  async fn test_import_missing_data_key_is_invalid_and_harmless() {
    let store = setup_test_store().await;
    populate(&store).await;
    let before = dump_all(&store).await;

    let result = import_json(&store, r#"{ "version": 1, "exportedAt": "2026-01-01" }"#).await;
    assert!(matches!(result, Err(StoreError::InvalidFormat(_))));

    let result = import_json(&store, "not json at all").await;
    assert!(matches!(result, Err(StoreError::InvalidFormat(_))));

    assert_eq!(dump_all(&store).await, before);
  }

  #[tokio::test]
  async fn test_import_is_full_replace_not_merge() {
    let store = setup_test_store().await;
    populate(&store).await;

    let empty = Backup {
      version: BACKUP_VERSION,
      exported_at: String::new(),
      data: BackupData::default(),
    };
    import(&store, &empty).await.expect("import failed");

    for table in Table::ALL {
      let rows = store.get_all(table).await.expect("get_all failed");
      assert!(rows.is_empty(), "{} should be empty", table.name());
    }
  }

  #[tokio::test]
  async fn test_import_tolerates_missing_arrays() {
    let store = setup_test_store().await;
    populate(&store).await;

    import_json(&store, r#"{ "data": { "meta": [ { "key": "seed_v1", "value": "1" } ] } }"#)
      .await
      .expect("import failed");

    assert_eq!(
      store.meta_get("seed_v1").await.expect("meta_get failed").as_deref(),
      Some("1")
    );
    assert!(store
      .get_all(Table::Sessions)
      .await
      .expect("get_all failed")
      .is_empty());
  }

  #[tokio::test]
  async fn test_reset_restores_seed_state() {
    let store = setup_test_store().await;
    seed::ensure_seed(&store).await.expect("seed failed");
    populate(&store).await;

    reset(&store).await.expect("reset failed");

    assert!(store
      .get_all(Table::Sessions)
      .await
      .expect("get_all failed")
      .is_empty());

    let exercises = store.get_all(Table::Exercises).await.expect("get_all failed");
    assert!(!exercises.is_empty());
    assert!(exercises.iter().all(|e| e["builtIn"] == serde_json::json!(true)));
    assert_eq!(
      store.meta_get("seed_v1").await.expect("meta_get failed").as_deref(),
      Some("1")
    );
  }
}
