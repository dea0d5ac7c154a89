//! Table and index registry plus versioned schema provisioning
//!
//! The registry is the single source of truth for the store layout: every
//! table, its key column, and its secondary indices are declared here and
//! the DDL is generated from the declarations. Provisioning is safe to run
//! on every startup - all creation statements check for existence first and
//! a version table gates each schema layer so future changes can be added
//! without data loss.

use sqlx::sqlite::SqlitePool;

use crate::store::StoreError;

/// ---------------------------------------------------------------------------
/// Table Registry
/// ---------------------------------------------------------------------------

/// The named record tables of the store.
///
/// All tables carry auto-assigned integer primary keys except `Meta`, which
/// is keyed by string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
  Sessions,
  Exercises,
  SessionExercises,
  Sets,
  Cardio,
  Meta,
}

impl Table {
  /// Every table, in dependency order (parents before children).
  pub const ALL: [Table; 6] = [
    Table::Meta,
    Table::Exercises,
    Table::Sessions,
    Table::SessionExercises,
    Table::Sets,
    Table::Cardio,
  ];

  /// SQL table name.
  pub fn name(self) -> &'static str {
    match self {
      Table::Sessions => "sessions",
      Table::Exercises => "exercises",
      Table::SessionExercises => "session_exercises",
      Table::Sets => "sets",
      Table::Cardio => "cardio",
      Table::Meta => "meta",
    }
  }

  /// Name of the key field injected into records read back from this table.
  pub fn key_field(self) -> &'static str {
    match self {
      Table::Meta => "key",
      _ => "id",
    }
  }

  /// Whether this table is keyed by string rather than rowid.
  pub fn text_keyed(self) -> bool {
    matches!(self, Table::Meta)
  }

  /// Secondary indices declared for this table.
  pub fn indices(self) -> &'static [IndexDef] {
    match self {
      Table::Sessions => &[
        IndexDef { name: "by_date", field: "dateISO", unique: false },
        IndexDef { name: "by_month", field: "monthKey", unique: false },
      ],
      Table::Exercises => &[
        IndexDef { name: "by_group", field: "group", unique: false },
        IndexDef { name: "by_name", field: "name", unique: false },
      ],
      Table::SessionExercises => &[
        IndexDef { name: "by_session", field: "sessionId", unique: false },
      ],
      Table::Sets => &[
        IndexDef { name: "by_sessionExercise", field: "sessionExerciseId", unique: false },
      ],
      Table::Cardio => &[
        // At most one cardio row per session exercise.
        IndexDef { name: "by_sessionExercise", field: "sessionExerciseId", unique: true },
      ],
      Table::Meta => &[],
    }
  }

  fn create_table_sql(self) -> String {
    if self.text_keyed() {
      format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  key TEXT PRIMARY KEY,\n  doc TEXT NOT NULL\n);\n",
        self.name()
      )
    } else {
      // AUTOINCREMENT keeps keys monotonic: rowids are never reused even
      // after deletes.
      format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  id INTEGER PRIMARY KEY AUTOINCREMENT,\n  doc TEXT NOT NULL\n);\n",
        self.name()
      )
    }
  }
}

/// A secondary index over one field of a table's JSON documents.
#[derive(Debug, Clone, Copy)]
pub struct IndexDef {
  /// Index name used by `get_all_by_index` lookups.
  pub name: &'static str,
  /// Top-level document field the index covers.
  pub field: &'static str,
  /// Unique indices reject duplicate values on write.
  pub unique: bool,
}

impl IndexDef {
  /// The extraction expression; index definition and query WHERE clause must
  /// use the identical text for SQLite to plan through the index.
  pub(crate) fn expr(&self) -> String {
    format!("json_extract(doc, '$.{}')", self.field)
  }

  fn create_sql(&self, table: Table) -> String {
    format!(
      "CREATE {}INDEX IF NOT EXISTS idx_{}_{} ON {} ({});\n",
      if self.unique { "UNIQUE " } else { "" },
      table.name(),
      self.name,
      table.name(),
      self.expr()
    )
  }
}

/// ---------------------------------------------------------------------------
/// Provisioning
/// ---------------------------------------------------------------------------

/// Current schema version.
pub const CURRENT_VERSION: i64 = 1;

const SCHEMA_VERSION_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS schema_version (
  version INTEGER PRIMARY KEY,
  applied_at TEXT NOT NULL
);";

fn initial_ddl() -> String {
  let mut ddl = String::new();
  for table in Table::ALL {
    ddl.push_str(&table.create_table_sql());
    for index in table.indices() {
      ddl.push_str(&index.create_sql(table));
    }
  }
  ddl
}

/// Create any missing tables and indices and record the schema version.
pub async fn provision(pool: &SqlitePool) -> Result<(), StoreError> {
  sqlx::raw_sql(SCHEMA_VERSION_TABLE).execute(pool).await?;

  let current: i64 =
    sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
      .fetch_one(pool)
      .await?;

  if current < CURRENT_VERSION {
    sqlx::raw_sql(&initial_ddl()).execute(pool).await?;

    sqlx::query("INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)")
      .bind(CURRENT_VERSION)
      .bind(chrono::Utc::now().to_rfc3339())
      .execute(pool)
      .await?;

    tracing::info!(version = CURRENT_VERSION, "store schema provisioned");
  }

  // Future versions layer here:
  // if current < 2 { ... }

  Ok(())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
