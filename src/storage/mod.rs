//! Durable key-value storage and the pending review queue built on it.
//!
//! The queue keeps a single JSON array under one namespaced key, the same
//! layout a browser would keep in local storage. Any [`KeyValueStore`] can
//! back it: SQLite for the agent, an in-memory map for tests.

pub mod memory;
pub mod pending;
pub mod sqlite;

use crate::error::StorageError;

pub use memory::MemoryStore;
pub use pending::{PendingUpdateStore, DEFAULT_PERSISTENCE_KEY};
pub use sqlite::SqliteStore;

/// Minimal string key-value persistence.
///
/// Implementations must make `set` a single replace of the whole value.
pub trait KeyValueStore: Send + Sync {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
  fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
  fn remove(&self, key: &str) -> Result<(), StorageError>;
}
