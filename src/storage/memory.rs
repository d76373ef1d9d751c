use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::KeyValueStore;
use crate::error::StorageError;

/// In-process store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
  values: Mutex<HashMap<String, String>>,
  fail_writes: AtomicBool,
  failing_reads: AtomicUsize,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make every subsequent `set` fail, like a full storage quota
  pub fn set_fail_writes(&self, fail: bool) {
    self.fail_writes.store(fail, Ordering::SeqCst);
  }

  /// Make the next `count` calls to `get` fail, like a busy or flaky disk
  pub fn fail_next_reads(&self, count: usize) {
    self.failing_reads.store(count, Ordering::SeqCst);
  }

  fn take_read_failure(&self) -> bool {
    self
      .failing_reads
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
      .is_ok()
  }
}

impl KeyValueStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    if self.take_read_failure() {
      return Err(StorageError::ReadFailed("disk busy".into()));
    }
    let values = self.values.lock().map_err(|_| StorageError::Lock)?;
    Ok(values.get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(StorageError::WriteRejected("quota exceeded".into()));
    }
    let mut values = self.values.lock().map_err(|_| StorageError::Lock)?;
    values.insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), StorageError> {
    let mut values = self.values.lock().map_err(|_| StorageError::Lock)?;
    values.remove(key);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_set_get_remove() {
    let store = MemoryStore::new();
    assert_eq!(store.get("k").unwrap(), None);
    store.set("k", "v").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    store.remove("k").unwrap();
    assert_eq!(store.get("k").unwrap(), None);
  }

  #[test]
  fn test_fail_writes_keeps_old_value() {
    let store = MemoryStore::new();
    store.set("k", "old").unwrap();
    store.set_fail_writes(true);
    assert!(matches!(store.set("k", "new"), Err(StorageError::WriteRejected(_))));
    assert_eq!(store.get("k").unwrap().as_deref(), Some("old"));
  }

  #[test]
  fn test_fail_next_reads_recovers() {
    let store = MemoryStore::new();
    store.set("k", "v").unwrap();
    store.fail_next_reads(2);
    assert!(matches!(store.get("k"), Err(StorageError::ReadFailed(_))));
    assert!(matches!(store.get("k"), Err(StorageError::ReadFailed(_))));
    assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
  }
}
