//! SQLite-backed key-value store

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::KeyValueStore;
use crate::db::{try_lock, DbPool};
use crate::error::StorageError;
#[cfg(feature = "profiling")]
use crate::profiling::EventType;

#[derive(Clone)]
pub struct SqliteStore {
  pool: DbPool,
}

impl SqliteStore {
  pub fn new(pool: DbPool) -> Self {
    Self { pool }
  }
}

impl KeyValueStore for SqliteStore {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::StorageOp {
      operation: "get".into(),
      key: key.into(),
    });

    let conn = try_lock(&self.pool)?;
    let value = conn
      .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| row.get(0))
      .optional()?;
    Ok(value)
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::StorageOp {
      operation: "set".into(),
      key: key.into(),
    });

    let conn = try_lock(&self.pool)?;
    conn.execute(
      r#"
      INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
      ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3
      "#,
      params![key, value, Utc::now().to_rfc3339()],
    )?;
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), StorageError> {
    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::StorageOp {
      operation: "remove".into(),
      key: key.into(),
    });

    let conn = try_lock(&self.pool)?;
    conn.execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::{init_db, init_memory_db};

  #[test]
  fn test_roundtrip_in_memory() {
    let store = SqliteStore::new(init_memory_db().unwrap());
    assert_eq!(store.get("queue").unwrap(), None);

    store.set("queue", "[]").unwrap();
    store.set("queue", "[1]").unwrap();
    assert_eq!(store.get("queue").unwrap().as_deref(), Some("[1]"));

    store.remove("queue").unwrap();
    assert_eq!(store.get("queue").unwrap(), None);
  }

  #[test]
  fn test_value_survives_reopen() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("queue.db");

    {
      let store = SqliteStore::new(init_db(&path).unwrap());
      store.set("queue", r#"[{"exampleId":1}]"#).unwrap();
    }

    let reopened = SqliteStore::new(init_db(&path).unwrap());
    assert_eq!(
      reopened.get("queue").unwrap().as_deref(),
      Some(r#"[{"exampleId":1}]"#)
    );
  }
}
