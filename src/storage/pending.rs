//! Durable queue of review outcomes the backend has not confirmed yet.

use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};

use super::KeyValueStore;
use crate::db::LogOnError;
use crate::domain::PendingFlashcardUpdate;
use crate::error::StorageError;

/// Key the pending list lives under unless configured otherwise
pub const DEFAULT_PERSISTENCE_KEY: &str = "flashcard_review.pending_flashcard_updates";

/// Pending review queue stored as one JSON array under a single key.
///
/// Reads are forgiving: anything that is not an array of records reads as
/// "nothing pending". A store that cannot be read at all is an error on every
/// write path. Writes report every failure to the caller and never retry.
///
/// Clones share the same locks. Read-modify-write operations are serialized,
/// and at most one flush may hold the flush gate at a time.
#[derive(Clone)]
pub struct PendingUpdateStore {
  kv: Arc<dyn KeyValueStore>,
  key: String,
  write_lock: Arc<Mutex<()>>,
  flush_gate: Arc<AsyncMutex<()>>,
}

impl PendingUpdateStore {
  pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
    Self::with_key(kv, DEFAULT_PERSISTENCE_KEY)
  }

  pub fn with_key(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
    Self {
      kv,
      key: key.into(),
      write_lock: Arc::new(Mutex::new(())),
      flush_gate: Arc::new(AsyncMutex::new(())),
    }
  }

  pub fn key(&self) -> &str {
    &self.key
  }

  /// Read the full pending list. `None` if absent or unreadable.
  pub fn load(&self) -> Option<Vec<PendingFlashcardUpdate>> {
    self
      .try_load()
      .log_warn("Failed to read pending flashcard updates")?
  }

  /// Like [`load`](Self::load), but a failed read of the store is an error.
  ///
  /// A missing or malformed value is still `Ok(None)`.
  pub fn try_load(&self) -> Result<Option<Vec<PendingFlashcardUpdate>>, StorageError> {
    Ok(self.kv.get(&self.key)?.and_then(|raw| self.parse(&raw)))
  }

  fn parse(&self, raw: &str) -> Option<Vec<PendingFlashcardUpdate>> {
    let value: serde_json::Value = serde_json::from_str(raw)
      .log_warn("Pending flashcard updates are not valid JSON")?;

    if !value.is_array() {
      tracing::warn!("Pending flashcard updates under {} are not an array", self.key);
      return None;
    }

    serde_json::from_value(value).log_warn("Pending flashcard updates have an unexpected shape")
  }

  /// Overwrite the pending list with a single write
  pub fn save(&self, updates: &[PendingFlashcardUpdate]) -> Result<(), StorageError> {
    let _guard = self.write_lock.lock().map_err(|_| StorageError::Lock)?;
    self.write(updates)
  }

  fn write(&self, updates: &[PendingFlashcardUpdate]) -> Result<(), StorageError> {
    let json = serde_json::to_string(updates)?;
    self.kv.set(&self.key, &json)
  }

  /// Insert a record, replacing any earlier one for the same example.
  ///
  /// Fails without writing if the current list cannot be read.
  pub fn upsert(&self, update: PendingFlashcardUpdate) -> Result<(), StorageError> {
    let _guard = self.write_lock.lock().map_err(|_| StorageError::Lock)?;
    let mut updates = self.try_load()?.unwrap_or_default();
    match updates.iter_mut().find(|u| u.example_id == update.example_id) {
      Some(existing) => *existing = update,
      None => updates.push(update),
    }
    self.write(&updates)
  }

  /// Drop the records a flush delivered. Returns how many remain.
  ///
  /// Only exact matches go: an example reviewed again after the snapshot was
  /// taken keeps its newer record.
  pub fn remove_flushed(&self, flushed: &[PendingFlashcardUpdate]) -> Result<usize, StorageError> {
    let _guard = self.write_lock.lock().map_err(|_| StorageError::Lock)?;
    let Some(mut updates) = self.try_load()? else {
      return Ok(0);
    };
    let before = updates.len();
    updates.retain(|u| !flushed.contains(u));
    if updates.len() != before {
      self.write(&updates)?;
    }
    Ok(updates.len())
  }

  pub fn len(&self) -> usize {
    self.load().map(|u| u.len()).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn clear(&self) -> Result<(), StorageError> {
    let _guard = self.write_lock.lock().map_err(|_| StorageError::Lock)?;
    self.kv.remove(&self.key)
  }

  /// Wait until no other flush of this queue is in flight
  pub async fn lock_flush(&self) -> AsyncMutexGuard<'_, ()> {
    self.flush_gate.lock().await
  }
}
