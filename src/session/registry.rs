//! Live review sessions of the local agent, keyed by session id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rand::Rng;
use tokio::task::JoinHandle;

use super::{flush_store, FlushReport, ReviewOutcome, ReviewSession};
use crate::domain::{Difficulty, StudentFlashcard};
use crate::error::SessionError;
use crate::storage::PendingUpdateStore;
use crate::submit::ReviewSubmitter;

type SessionMap<S> = HashMap<String, Arc<ReviewSession<S>>>;

pub struct SessionRegistry<S: ReviewSubmitter> {
  store: PendingUpdateStore,
  submitter: Arc<S>,
  sessions: Mutex<SessionMap<S>>,
  /// Pending count at which a review kicks off a background flush (0 disables)
  flush_batch_size: usize,
}

impl<S: ReviewSubmitter> SessionRegistry<S> {
  pub fn new(store: PendingUpdateStore, submitter: Arc<S>, flush_batch_size: usize) -> Self {
    Self {
      store,
      submitter,
      sessions: Mutex::new(HashMap::new()),
      flush_batch_size,
    }
  }

  pub fn store(&self) -> &PendingUpdateStore {
    &self.store
  }

  fn lock_sessions(&self) -> MutexGuard<'_, SessionMap<S>> {
    self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// Open a session for the given flashcards and return its id
  pub fn start(&self, flashcards: &[StudentFlashcard]) -> (String, Arc<ReviewSession<S>>) {
    let session_id = generate_session_id();
    let session = Arc::new(ReviewSession::new(
      self.store.clone(),
      Arc::clone(&self.submitter),
      flashcards,
    ));
    self
      .lock_sessions()
      .insert(session_id.clone(), Arc::clone(&session));
    tracing::debug!("Started review session {} with {} flashcards", session_id, flashcards.len());
    (session_id, session)
  }

  pub fn get(&self, session_id: &str) -> Option<Arc<ReviewSession<S>>> {
    self.lock_sessions().get(session_id).cloned()
  }

  fn require(&self, session_id: &str) -> Result<Arc<ReviewSession<S>>, SessionError> {
    self
      .get(session_id)
      .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
  }

  /// Record a review; a full enough queue is flushed in the background
  pub fn record_review(
    &self,
    session_id: &str,
    example_id: i64,
    difficulty: Difficulty,
  ) -> Result<ReviewOutcome, SessionError> {
    let session = self.require(session_id)?;
    let outcome = session.handle_review_example(example_id, difficulty)?;

    if self.flush_batch_size > 0 && session.pending_count() >= self.flush_batch_size {
      tracing::debug!("Session {} reached {} pending reviews, flushing", session_id, self.flush_batch_size);
      let _ = session.spawn_flush();
    }
    Ok(outcome)
  }

  pub async fn flush(&self, session_id: &str) -> Result<FlushReport, SessionError> {
    let session = self.require(session_id)?;
    session.flush_batch().await
  }

  /// Remove a session and fire its final flush
  pub fn end(
    &self,
    session_id: &str,
  ) -> Result<Option<JoinHandle<Result<FlushReport, SessionError>>>, SessionError> {
    let session = self
      .lock_sessions()
      .remove(session_id)
      .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
    tracing::debug!("Ending review session {}", session_id);
    Ok(session.end())
  }

  /// Flush every live session, or the bare queue when none is open.
  ///
  /// Returns the number of records submitted. Failures are logged; the records
  /// stay queued.
  pub async fn flush_all(&self) -> usize {
    let sessions: Vec<(String, Arc<ReviewSession<S>>)> = self
      .lock_sessions()
      .iter()
      .map(|(id, session)| (id.clone(), Arc::clone(session)))
      .collect();

    if sessions.is_empty() {
      return match flush_store(&self.store, self.submitter.as_ref()).await {
        Ok(report) => report.submitted(),
        Err(e) => {
          tracing::warn!("Periodic flush failed: {}", e);
          0
        }
      };
    }

    let mut submitted = 0;
    for (id, session) in sessions {
      match session.flush_batch().await {
        Ok(report) => submitted += report.submitted(),
        Err(e) => tracing::warn!("Periodic flush of session {} failed: {}", id, e),
      }
    }
    submitted
  }

  pub fn len(&self) -> usize {
    self.lock_sessions().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

fn generate_session_id() -> String {
  let mut rng = rand::rng();
  (0..32)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}
