//! Test doubles and fixtures shared by unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tokio::sync::Semaphore;

use crate::db;
use crate::domain::PendingFlashcardUpdate;
use crate::error::SubmitError;
use crate::storage::{MemoryStore, PendingUpdateStore, SqliteStore};
use crate::submit::ReviewSubmitter;

/// Pending queue over an in-memory store, returning the store for fault injection
pub fn pending_store() -> (Arc<MemoryStore>, PendingUpdateStore) {
  let kv = Arc::new(MemoryStore::new());
  let store = PendingUpdateStore::new(kv.clone());
  (kv, store)
}

/// Test environment with an on-disk SQLite queue in a temporary directory.
///
/// The directory is removed when the environment is dropped.
pub struct TestEnv {
  pub temp: TempDir,
  pub store: PendingUpdateStore,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().expect("create temp dir");
    let pool = db::init_db(&temp.path().join("review_queue.db")).expect("init queue db");
    let store = PendingUpdateStore::new(Arc::new(SqliteStore::new(pool)));
    Self { temp, store }
  }

  /// Reopen the database file, as a restarted process would
  pub fn reopen(&self) -> PendingUpdateStore {
    let pool = db::init_db(&self.temp.path().join("review_queue.db")).expect("reopen queue db");
    PendingUpdateStore::new(Arc::new(SqliteStore::new(pool)))
  }
}

/// Records every batch it is asked to submit.
///
/// Can be switched to fail, and can hold submissions until released, to
/// simulate a slow backend.
#[derive(Default)]
pub struct MockSubmitter {
  attempts: AtomicUsize,
  accepted: Mutex<Vec<Vec<PendingFlashcardUpdate>>>,
  fail: AtomicBool,
  gate: Option<Arc<Semaphore>>,
}

impl MockSubmitter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Each submission waits for one permit on the returned semaphore
  pub fn gated() -> (Self, Arc<Semaphore>) {
    let gate = Arc::new(Semaphore::new(0));
    let submitter = Self {
      gate: Some(gate.clone()),
      ..Self::default()
    };
    (submitter, gate)
  }

  pub fn set_fail(&self, fail: bool) {
    self.fail.store(fail, Ordering::SeqCst);
  }

  /// Number of submissions made, failed ones included
  pub fn call_count(&self) -> usize {
    self.attempts.load(Ordering::SeqCst)
  }

  /// Batches the backend accepted
  pub fn batches(&self) -> Vec<Vec<PendingFlashcardUpdate>> {
    self.accepted.lock().unwrap().clone()
  }
}

impl ReviewSubmitter for MockSubmitter {
  async fn submit(&self, batch: &[PendingFlashcardUpdate]) -> Result<(), SubmitError> {
    if let Some(gate) = &self.gate {
      gate
        .acquire()
        .await
        .map_err(|e| SubmitError::Other(e.to_string()))?
        .forget();
    }

    self.attempts.fetch_add(1, Ordering::SeqCst);
    if self.fail.load(Ordering::SeqCst) {
      return Err(SubmitError::Other("backend unavailable".into()));
    }
    self.accepted.lock().unwrap().push(batch.to_vec());
    Ok(())
  }
}
