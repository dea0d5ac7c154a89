//! Record store over SQLite
//!
//! Generic persistence for the named tables declared in [`crate::schema`]:
//! each record is a JSON document in a `doc` column, keyed by an
//! auto-assigned integer rowid (string key for `meta`), with secondary
//! indices maintained by the engine as expression indexes over
//! `json_extract`. The store exposes CRUD primitives only - referential
//! integrity across tables is the repository layer's job and the record
//! tables deliberately carry no foreign keys.
//!
//! Every primitive has an executor-generic inner function (`*_in`) so the
//! repository can run a whole cascade or replace sequence inside one
//! transaction obtained from [`Store::begin`].

use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{Executor, Row, Sqlite, SqliteConnection, Transaction};
use thiserror::Error;

use crate::models::MetaEntry;
use crate::schema::Table;

/// ---------------------------------------------------------------------------
/// Keys
/// ---------------------------------------------------------------------------

/// Primary key of a stored record: integer for the rowid tables, string
/// for `meta`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
  Int(i64),
  Text(String),
}

impl Key {
  pub fn as_int(&self) -> Option<i64> {
    match self {
      Key::Int(v) => Some(*v),
      Key::Text(_) => None,
    }
  }

  /// Unwrap the integer key assigned by a rowid table.
  pub(crate) fn into_int(self, table: Table) -> Result<i64, StoreError> {
    match self {
      Key::Int(v) => Ok(v),
      Key::Text(_) => Err(StoreError::UnexpectedKey(table.name())),
    }
  }

  fn to_json(&self) -> Value {
    match self {
      Key::Int(v) => Value::from(*v),
      Key::Text(s) => Value::from(s.clone()),
    }
  }
}

impl From<i64> for Key {
  fn from(v: i64) -> Self {
    Key::Int(v)
  }
}

impl From<&str> for Key {
  fn from(s: &str) -> Self {
    Key::Text(s.to_string())
  }
}

impl From<String> for Key {
  fn from(s: String) -> Self {
    Key::Text(s)
  }
}

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
  /// The persistence layer failed to open or provision; fatal.
  #[error("storage unavailable: {0}")]
  StorageUnavailable(String),

  /// A unique index rejected a write.
  #[error("unique index violated: {0}")]
  ConstraintViolation(String),

  /// An import document failed shape validation; the store is untouched.
  #[error("invalid backup document: {0}")]
  InvalidFormat(String),

  /// A session date did not parse as a calendar date.
  #[error("invalid session date {0:?}, expected YYYY-MM-DD")]
  InvalidDate(String),

  /// A record destined for a string-keyed table carries no key field.
  #[error("record for '{table}' is missing its '{key}' field")]
  MissingKey { table: &'static str, key: &'static str },

  /// Lookup against an index name the table does not declare.
  #[error("no index named '{index}' on '{table}'")]
  UnknownIndex { table: &'static str, index: String },

  /// A rowid table handed back a non-integer key.
  #[error("expected an integer key for table '{0}'")]
  UnexpectedKey(&'static str),

  #[error("query failed: {0}")]
  Query(#[from] sqlx::Error),

  #[error("record encoding failed: {0}")]
  Codec(#[from] serde_json::Error),
}

/// Map write failures, surfacing unique-index clashes as their own kind.
fn write_error(table: Table, e: sqlx::Error) -> StoreError {
  if let sqlx::Error::Database(db) = &e {
    if db.is_unique_violation() {
      return StoreError::ConstraintViolation(format!("{}: {}", table.name(), db.message()));
    }
  }
  StoreError::Query(e)
}

/// ---------------------------------------------------------------------------
/// Row Decoding
/// ---------------------------------------------------------------------------

/// Inject the primary key into a decoded document, mirroring keyPath
/// injection: records read back always carry their key.
fn decode_record(table: Table, key: Key, doc: &str) -> Result<Value, StoreError> {
  let mut record: Value = serde_json::from_str(doc)?;
  if let Value::Object(fields) = &mut record {
    fields.insert(table.key_field().to_string(), key.to_json());
  }
  Ok(record)
}

fn row_to_record(table: Table, row: &SqliteRow) -> Result<Value, StoreError> {
  let key = if table.text_keyed() {
    Key::Text(row.try_get::<String, _>(0)?)
  } else {
    Key::Int(row.try_get::<i64, _>(0)?)
  };
  let doc: String = row.try_get(1)?;
  decode_record(table, key, &doc)
}

/// Key embedded in an outgoing record, if any.
fn embedded_key(table: Table, record: &Value) -> Option<Key> {
  let field = record.get(table.key_field())?;
  if table.text_keyed() {
    field.as_str().map(|s| Key::Text(s.to_string()))
  } else {
    field.as_i64().map(Key::Int)
  }
}

/// ---------------------------------------------------------------------------
/// Primitives (executor-generic)
/// ---------------------------------------------------------------------------

/// Fetch one record by primary key; `None` when absent, never an error.
pub(crate) async fn get_in<'e, E>(
  exec: E,
  table: Table,
  key: &Key,
) -> Result<Option<Value>, StoreError>
where
  E: Executor<'e, Database = Sqlite>,
{
  let sql = format!(
    "SELECT {key}, doc FROM {table} WHERE {key} = ?1",
    key = table.key_field(),
    table = table.name()
  );

  let query = sqlx::query(&sql);
  let query = match key {
    Key::Int(v) => query.bind(*v),
    Key::Text(s) => query.bind(s.clone()),
  };

  match query.fetch_optional(exec).await? {
    Some(row) => Ok(Some(row_to_record(table, &row)?)),
    None => Ok(None),
  }
}

/// Upsert by primary key; a record without a key is inserted and assigned
/// the next one. Returns the record's key.
pub(crate) async fn put_in<'e, E>(
  exec: E,
  table: Table,
  record: &Value,
) -> Result<Key, StoreError>
where
  E: Executor<'e, Database = Sqlite>,
{
  let doc = record.to_string();

  match embedded_key(table, record) {
    Some(Key::Text(key)) => {
      let sql = format!(
        "INSERT INTO {table} (key, doc) VALUES (?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET doc = excluded.doc",
        table = table.name()
      );
      sqlx::query(&sql)
        .bind(key.clone())
        .bind(doc)
        .execute(exec)
        .await
        .map_err(|e| write_error(table, e))?;
      Ok(Key::Text(key))
    }
    Some(Key::Int(id)) => {
      let sql = format!(
        "INSERT INTO {table} (id, doc) VALUES (?1, ?2) \
         ON CONFLICT(id) DO UPDATE SET doc = excluded.doc",
        table = table.name()
      );
      sqlx::query(&sql)
        .bind(id)
        .bind(doc)
        .execute(exec)
        .await
        .map_err(|e| write_error(table, e))?;
      Ok(Key::Int(id))
    }
    None if table.text_keyed() => Err(StoreError::MissingKey {
      table: table.name(),
      key: table.key_field(),
    }),
    None => {
      let sql = format!("INSERT INTO {table} (doc) VALUES (?1)", table = table.name());
      let result = sqlx::query(&sql)
        .bind(doc)
        .execute(exec)
        .await
        .map_err(|e| write_error(table, e))?;
      Ok(Key::Int(result.last_insert_rowid()))
    }
  }
}

/// Insert a new record, assigning the next primary key (or honoring an
/// embedded one); never updates. Returns the assigned key.
pub(crate) async fn add_in<'e, E>(
  exec: E,
  table: Table,
  record: &Value,
) -> Result<Key, StoreError>
where
  E: Executor<'e, Database = Sqlite>,
{
  let doc = record.to_string();

  match embedded_key(table, record) {
    Some(Key::Text(key)) => {
      let sql = format!(
        "INSERT INTO {table} (key, doc) VALUES (?1, ?2)",
        table = table.name()
      );
      sqlx::query(&sql)
        .bind(key.clone())
        .bind(doc)
        .execute(exec)
        .await
        .map_err(|e| write_error(table, e))?;
      Ok(Key::Text(key))
    }
    Some(Key::Int(id)) => {
      let sql = format!(
        "INSERT INTO {table} (id, doc) VALUES (?1, ?2)",
        table = table.name()
      );
      sqlx::query(&sql)
        .bind(id)
        .bind(doc)
        .execute(exec)
        .await
        .map_err(|e| write_error(table, e))?;
      Ok(Key::Int(id))
    }
    None if table.text_keyed() => Err(StoreError::MissingKey {
      table: table.name(),
      key: table.key_field(),
    }),
    None => {
      let sql = format!("INSERT INTO {table} (doc) VALUES (?1)", table = table.name());
      let result = sqlx::query(&sql)
        .bind(doc)
        .execute(exec)
        .await
        .map_err(|e| write_error(table, e))?;
      Ok(Key::Int(result.last_insert_rowid()))
    }
  }
}

/// Remove one record; a missing key is a no-op, not an error.
pub(crate) async fn delete_in<'e, E>(exec: E, table: Table, key: &Key) -> Result<(), StoreError>
where
  E: Executor<'e, Database = Sqlite>,
{
  let sql = format!(
    "DELETE FROM {table} WHERE {key} = ?1",
    table = table.name(),
    key = table.key_field()
  );

  let query = sqlx::query(&sql);
  let query = match key {
    Key::Int(v) => query.bind(*v),
    Key::Text(s) => query.bind(s.clone()),
  };

  query.execute(exec).await?;
  Ok(())
}

/// Fetch every record of a table. Key order, but callers treat the result
/// as a set.
pub(crate) async fn get_all_in<'e, E>(exec: E, table: Table) -> Result<Vec<Value>, StoreError>
where
  E: Executor<'e, Database = Sqlite>,
{
  let sql = format!(
    "SELECT {key}, doc FROM {table} ORDER BY {key}",
    key = table.key_field(),
    table = table.name()
  );

  let rows = sqlx::query(&sql).fetch_all(exec).await?;
  rows.iter().map(|row| row_to_record(table, row)).collect()
}

/// Fetch all records whose indexed field equals `value` (exact match).
pub(crate) async fn get_all_by_index_in<'e, E>(
  exec: E,
  table: Table,
  index: &str,
  value: &Key,
) -> Result<Vec<Value>, StoreError>
where
  E: Executor<'e, Database = Sqlite>,
{
  let def = table
    .indices()
    .iter()
    .find(|d| d.name == index)
    .ok_or_else(|| StoreError::UnknownIndex {
      table: table.name(),
      index: index.to_string(),
    })?;

  let sql = format!(
    "SELECT {key}, doc FROM {table} WHERE {expr} = ?1 ORDER BY {key}",
    key = table.key_field(),
    table = table.name(),
    expr = def.expr()
  );

  let query = sqlx::query(&sql);
  let query = match value {
    Key::Int(v) => query.bind(*v),
    Key::Text(s) => query.bind(s.clone()),
  };

  let rows = query.fetch_all(exec).await?;
  rows.iter().map(|row| row_to_record(table, row)).collect()
}

/// Empty every known table. Callers wrap this in a transaction so the wipe
/// is all-or-nothing.
pub(crate) async fn clear_all_in(conn: &mut SqliteConnection) -> Result<(), StoreError> {
  for table in Table::ALL {
    let sql = format!("DELETE FROM {table}", table = table.name());
    sqlx::query(&sql).execute(&mut *conn).await?;
  }
  Ok(())
}

/// Write one meta key/value row (upsert).
pub(crate) async fn meta_set_in<'e, E>(exec: E, key: &str, value: &str) -> Result<(), StoreError>
where
  E: Executor<'e, Database = Sqlite>,
{
  let entry = MetaEntry { key: key.to_string(), value: value.to_string() };
  put_in(exec, Table::Meta, &serde_json::to_value(&entry)?).await?;
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Store Handle
/// ---------------------------------------------------------------------------

/// Handle over the connection pool; cheap to clone.
#[derive(Clone)]
pub struct Store {
  pool: SqlitePool,
}

impl Store {
  pub(crate) fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &SqlitePool {
    &self.pool
  }

  /// Begin a transaction for a multi-step sequence that must be atomic.
  pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, StoreError> {
    Ok(self.pool.begin().await?)
  }

  pub async fn close(&self) {
    self.pool.close().await;
  }

  pub async fn get(
    &self,
    table: Table,
    key: impl Into<Key>,
  ) -> Result<Option<Value>, StoreError> {
    get_in(&self.pool, table, &key.into()).await
  }

  pub async fn put(&self, table: Table, record: &Value) -> Result<Key, StoreError> {
    put_in(&self.pool, table, record).await
  }

  pub async fn add(&self, table: Table, record: &Value) -> Result<Key, StoreError> {
    add_in(&self.pool, table, record).await
  }

  pub async fn delete(&self, table: Table, key: impl Into<Key>) -> Result<(), StoreError> {
    delete_in(&self.pool, table, &key.into()).await
  }

  pub async fn get_all(&self, table: Table) -> Result<Vec<Value>, StoreError> {
    get_all_in(&self.pool, table).await
  }

  pub async fn get_all_by_index(
    &self,
    table: Table,
    index: &str,
    value: impl Into<Key>,
  ) -> Result<Vec<Value>, StoreError> {
    get_all_by_index_in(&self.pool, table, index, &value.into()).await
  }

  /// Empty every table atomically.
  pub async fn clear_all(&self) -> Result<(), StoreError> {
    let mut tx = self.begin().await?;
    clear_all_in(&mut tx).await?;
    tx.commit().await?;
    Ok(())
  }

  /// Read the string value of one meta row, `None` when absent.
  pub async fn meta_get(&self, key: &str) -> Result<Option<String>, StoreError> {
    let record = self.get(Table::Meta, key).await?;
    Ok(
      record
        .as_ref()
        .and_then(|r| r.get("value"))
        .and_then(Value::as_str)
        .map(str::to_string),
    )
  }

  /// Upsert one meta key/value row.
  pub async fn meta_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    meta_set_in(&self.pool, key, value).await
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
