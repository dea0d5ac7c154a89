//! Session repository
//!
//! The one layer that enforces cross-table rules: month-key recomputation,
//! the full-replace save of a session's exercise detail, the
//! strength-or-cardio rule, and cascade deletes. The record tables have no
//! referential constraints of their own, so every cascade or replace here
//! runs inside a single transaction - a failure mid-sequence can never
//! leave a partially written entity graph behind.

use serde_json::Value;
use sqlx::SqliteConnection;

use crate::models::{
  month_key_for, CardioEntry, Exercise, ExerciseKind, Session, SessionExercise, SessionType,
  SetEntry,
};
use crate::schema::Table;
use crate::store::{self, Key, Store, StoreError};

/// ---------------------------------------------------------------------------
/// Draft Types
/// ---------------------------------------------------------------------------

/// The editable shape of a session before it is saved. The id is `None`
/// for a new session and set when editing an existing one.
#[derive(Debug, Clone)]
pub struct SessionDraft {
  pub id: Option<i64>,
  pub date_iso: String,
  pub session_type: SessionType,
  pub duration_min: i64,
  pub notes: Option<String>,
  pub intensity: Option<String>,
  pub other_name: Option<String>,
}

/// One entry of the draft's ordered exercise list. Save order follows the
/// position in the draft array; any previously persisted order is
/// discarded. Entries without a resolved catalog exercise are skipped
/// silently on save.
#[derive(Debug, Clone)]
pub struct DraftExercise {
  pub exercise: Option<Exercise>,
  pub done: bool,
  pub sets: Vec<DraftSet>,
  pub cardio: Option<DraftCardio>,
}

impl DraftExercise {
  /// Fresh draft row for a catalog exercise, pre-filled with the default
  /// detail for its kind.
  pub fn for_exercise(exercise: Exercise) -> Self {
    let (sets, cardio) = match exercise.kind {
      ExerciseKind::Strength => (vec![DraftSet::default()], None),
      ExerciseKind::Cardio => (Vec::new(), Some(DraftCardio::default())),
    };
    Self { exercise: Some(exercise), done: true, sets, cardio }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftSet {
  pub set_number: i64,
  pub reps: i64,
  pub weight_kg: f64,
}

impl Default for DraftSet {
  fn default() -> Self {
    Self { set_number: 1, reps: 10, weight_kg: 10.0 }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftCardio {
  pub minutes: f64,
  pub km: f64,
}

impl Default for DraftCardio {
  fn default() -> Self {
    Self { minutes: 20.0, km: 2.0 }
  }
}

/// ---------------------------------------------------------------------------
/// Loaded Detail
/// ---------------------------------------------------------------------------

/// A session joined with its full exercise detail, in display order.
#[derive(Debug, Clone)]
pub struct SessionDetail {
  pub session: Session,
  pub exercise_rows: Vec<ExerciseRow>,
}

/// One persisted session-exercise row joined with its catalog entry and
/// detail rows.
#[derive(Debug, Clone)]
pub struct ExerciseRow {
  pub session_exercise: SessionExercise,
  pub exercise: Option<Exercise>,
  /// Ordered by set number.
  pub sets: Vec<SetEntry>,
  pub cardio: Option<CardioEntry>,
}

impl ExerciseRow {
  /// Convert back into the editable draft shape for a re-save.
  pub fn into_draft(self) -> DraftExercise {
    DraftExercise {
      exercise: self.exercise,
      done: self.session_exercise.done,
      sets: self
        .sets
        .into_iter()
        .map(|s| DraftSet { set_number: s.set_number, reps: s.reps, weight_kg: s.weight_kg })
        .collect(),
      cardio: self.cardio.map(|c| DraftCardio { minutes: c.minutes, km: c.km }),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Save
/// ---------------------------------------------------------------------------

/// Save a session draft together with its exercise rows.
///
/// Updates in place when the draft carries an id, inserts otherwise. The
/// month key is always recomputed from the date. Exercise detail is a full
/// replace: all existing dependent rows are deleted, then - for gym
/// sessions only - one session-exercise row is inserted per resolved draft
/// entry in array order, with its set rows or cardio row. Returns the
/// session id.
pub async fn save_session(
  store: &Store,
  draft: &SessionDraft,
  rows: &[DraftExercise],
) -> Result<i64, StoreError> {
  let month_key = month_key_for(&draft.date_iso)?;

  let session = Session {
    id: draft.id,
    date_iso: draft.date_iso.clone(),
    month_key,
    session_type: draft.session_type,
    duration_min: draft.duration_min.max(0),
    notes: clean_text(&draft.notes),
    intensity: match draft.session_type {
      SessionType::Basketball => clean_text(&draft.intensity),
      _ => None,
    },
    other_name: match draft.session_type {
      SessionType::Other => clean_text(&draft.other_name),
      _ => None,
    },
  };

  let doc = serde_json::to_value(&session)?;
  let mut tx = store.begin().await?;

  let session_id = match session.id {
    Some(id) => {
      store::put_in(&mut *tx, Table::Sessions, &doc).await?;
      id
    }
    None => store::add_in(&mut *tx, Table::Sessions, &doc)
      .await?
      .into_int(Table::Sessions)?,
  };

  // Full replace: a non-gym session never owns exercise detail, and a gym
  // session's detail is rewritten from the draft order.
  delete_session_detail(&mut tx, session_id).await?;

  if draft.session_type == SessionType::Gym {
    for (position, row) in rows.iter().enumerate() {
      let exercise = match &row.exercise {
        Some(e) => e,
        None => continue,
      };
      let exercise_id = match exercise.id {
        Some(id) => id,
        None => continue,
      };

      let link = SessionExercise {
        id: None,
        session_id,
        exercise_id,
        done: row.done,
        order_index: position as i64,
      };
      let se_id = store::add_in(&mut *tx, Table::SessionExercises, &serde_json::to_value(&link)?)
        .await?
        .into_int(Table::SessionExercises)?;

      match exercise.kind {
        ExerciseKind::Cardio => {
          let cardio = row.cardio.clone().unwrap_or_default();
          let entry = CardioEntry {
            id: None,
            session_exercise_id: se_id,
            minutes: cardio.minutes.max(0.0),
            km: cardio.km.max(0.0),
          };
          store::add_in(&mut *tx, Table::Cardio, &serde_json::to_value(&entry)?).await?;
        }
        ExerciseKind::Strength => {
          for set in &row.sets {
            let entry = SetEntry {
              id: None,
              session_exercise_id: se_id,
              set_number: set.set_number,
              reps: set.reps.max(0),
              weight_kg: set.weight_kg.max(0.0),
            };
            store::add_in(&mut *tx, Table::Sets, &serde_json::to_value(&entry)?).await?;
          }
        }
      }
    }
  }

  tx.commit().await?;
  Ok(session_id)
}

fn clean_text(value: &Option<String>) -> Option<String> {
  value
    .as_ref()
    .map(|s| s.trim())
    .filter(|s| !s.is_empty())
    .map(str::to_string)
}

/// ---------------------------------------------------------------------------
/// Delete
/// ---------------------------------------------------------------------------

/// Delete a session together with all of its dependent rows. A missing
/// session is a no-op.
pub async fn delete_session_cascade(store: &Store, session_id: i64) -> Result<(), StoreError> {
  let mut tx = store.begin().await?;

  if store::get_in(&mut *tx, Table::Sessions, &Key::Int(session_id))
    .await?
    .is_none()
  {
    return Ok(());
  }

  delete_session_detail(&mut tx, session_id).await?;
  store::delete_in(&mut *tx, Table::Sessions, &Key::Int(session_id)).await?;

  tx.commit().await?;
  tracing::debug!(session_id, "session cascade-deleted");
  Ok(())
}

/// Delete every session-exercise row of a session along with its set rows
/// and cardio row. Runs on the caller's transaction.
async fn delete_session_detail(
  conn: &mut SqliteConnection,
  session_id: i64,
) -> Result<(), StoreError> {
  let links =
    store::get_all_by_index_in(&mut *conn, Table::SessionExercises, "by_session", &Key::Int(session_id))
      .await?;

  for link in links {
    let se_id = record_id(Table::SessionExercises, &link)?;

    let sets =
      store::get_all_by_index_in(&mut *conn, Table::Sets, "by_sessionExercise", &Key::Int(se_id))
        .await?;
    for set in sets {
      store::delete_in(&mut *conn, Table::Sets, &Key::Int(record_id(Table::Sets, &set)?)).await?;
    }

    let cardio =
      store::get_all_by_index_in(&mut *conn, Table::Cardio, "by_sessionExercise", &Key::Int(se_id))
        .await?;
    for row in cardio {
      store::delete_in(&mut *conn, Table::Cardio, &Key::Int(record_id(Table::Cardio, &row)?))
        .await?;
    }

    store::delete_in(&mut *conn, Table::SessionExercises, &Key::Int(se_id)).await?;
  }

  Ok(())
}

/// Integer key of a record read back from the store.
fn record_id(table: Table, record: &Value) -> Result<i64, StoreError> {
  record
    .get(table.key_field())
    .and_then(Value::as_i64)
    .ok_or(StoreError::MissingKey { table: table.name(), key: table.key_field() })
}

/// ---------------------------------------------------------------------------
/// Load
/// ---------------------------------------------------------------------------

/// Reconstruct the editable shape of a session: its row, plus exercise
/// rows ordered by their persisted order, each joined with the catalog
/// entry, set rows ordered by set number, and cardio row. `None` when the
/// session does not exist.
pub async fn load_session_detail(
  store: &Store,
  session_id: i64,
) -> Result<Option<SessionDetail>, StoreError> {
  let session = match store.get(Table::Sessions, session_id).await? {
    Some(doc) => serde_json::from_value::<Session>(doc)?,
    None => return Ok(None),
  };

  let mut links: Vec<SessionExercise> = store
    .get_all_by_index(Table::SessionExercises, "by_session", session_id)
    .await?
    .into_iter()
    .map(serde_json::from_value)
    .collect::<Result<_, _>>()?;
  links.sort_by_key(|l| l.order_index);

  let mut exercise_rows = Vec::with_capacity(links.len());
  for link in links {
    let se_id = link.id.ok_or(StoreError::MissingKey {
      table: Table::SessionExercises.name(),
      key: "id",
    })?;

    let exercise = match store.get(Table::Exercises, link.exercise_id).await? {
      Some(doc) => Some(serde_json::from_value::<Exercise>(doc)?),
      None => None,
    };

    let mut sets: Vec<SetEntry> = store
      .get_all_by_index(Table::Sets, "by_sessionExercise", se_id)
      .await?
      .into_iter()
      .map(serde_json::from_value)
      .collect::<Result<_, _>>()?;
    sets.sort_by_key(|s| s.set_number);

    let cardio = store
      .get_all_by_index(Table::Cardio, "by_sessionExercise", se_id)
      .await?
      .into_iter()
      .next()
      .map(serde_json::from_value::<CardioEntry>)
      .transpose()?;

    exercise_rows.push(ExerciseRow { session_exercise: link, exercise, sets, cardio });
  }

  Ok(Some(SessionDetail { session, exercise_rows }))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
