use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fs;
use std::path::Path;

use crate::schema;
use crate::store::{Store, StoreError};

/// Open (or create) the store at the given file path and provision the
/// schema. Any failure here is fatal to the session: there is no degraded
/// mode without persistence.
pub async fn open(path: &Path) -> Result<Store, StoreError> {
  // Create the data directory if it doesn't exist
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)
      .map_err(|e| StoreError::StorageUnavailable(format!("failed to create data dir: {}", e)))?;
  }

  let db_url = format!("sqlite://{}?mode=rwc", path.display());
  tracing::info!(path = %path.display(), "opening store");

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await
    .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;

  finish_open(pool).await
}

/// Open a fresh in-memory store.
///
/// Pinned to one connection: extra pool connections would each see their
/// own empty in-memory database.
pub async fn open_in_memory() -> Result<Store, StoreError> {
  let pool = SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;

  finish_open(pool).await
}

async fn finish_open(pool: SqlitePool) -> Result<Store, StoreError> {
  schema::provision(&pool)
    .await
    .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;

  Ok(Store::new(pool))
}
