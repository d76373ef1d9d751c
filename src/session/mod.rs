//! Review session: per-example outcomes for one quiz, mirrored into the
//! durable queue and flushed to the backend in batches.
//!
//! Lifecycle of an example within a session:
//!
//! ```text
//! unreviewed --review(easy|hard)--> reviewed, pending
//! reviewed, pending --flush ok--> reviewed, synced
//! reviewed, pending --flush failed--> reviewed, pending (still queued)
//! unreviewed --review(viewed)--> reviewed, synced (nothing to send)
//! ```

pub mod flush;
pub mod registry;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::domain::{Difficulty, PendingFlashcardUpdate, ReviewedResult, StudentFlashcard};
use crate::error::SessionError;
use crate::srs::{calculate_new_srs_interval, get_current_interval};
use crate::storage::PendingUpdateStore;
use crate::submit::ReviewSubmitter;

pub use flush::{flush_store, FlushReport};
pub use registry::SessionRegistry;

/// Result of recording one review, for immediate display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
  pub example_id: i64,
  pub difficulty: Difficulty,
  pub pending: bool,
  pub previous_interval: u32,
  pub new_interval: u32,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
  result: ReviewedResult,
  /// Record queued for the backend, if the review was rated
  update: Option<PendingFlashcardUpdate>,
  /// Whether `update` made it into the durable store
  queued: bool,
}

#[derive(Debug, Default)]
struct SessionState {
  /// Intervals as the backend knew them when the session started
  baseline: HashMap<i64, u32>,
  entries: HashMap<i64, Entry>,
  /// Review order, for stable listing
  order: Vec<i64>,
}

struct SessionInner<S> {
  store: PendingUpdateStore,
  submitter: Arc<S>,
  state: Mutex<SessionState>,
}

/// One quiz session.
///
/// Dropping the session (or calling [`ReviewSession::end`]) starts a final
/// flush on the tokio runtime without waiting for it.
pub struct ReviewSession<S: ReviewSubmitter> {
  inner: Arc<SessionInner<S>>,
  ended: AtomicBool,
}

impl<S: ReviewSubmitter> ReviewSession<S> {
  pub fn new(store: PendingUpdateStore, submitter: Arc<S>, flashcards: &[StudentFlashcard]) -> Self {
    let baseline = flashcards
      .iter()
      .map(|card| (card.example_id, get_current_interval(card.srs_interval)))
      .collect();

    Self {
      inner: Arc::new(SessionInner {
        store,
        submitter,
        state: Mutex::new(SessionState {
          baseline,
          ..Default::default()
        }),
      }),
      ended: AtomicBool::new(false),
    }
  }

  /// Record a review of `example_id`.
  ///
  /// Reviewing the same example again replaces the earlier outcome. The
  /// in-memory state is updated even if the durable write fails; that error is
  /// returned so the caller can surface it, and the record is queued again on
  /// the next flush.
  pub fn handle_review_example(
    &self,
    example_id: i64,
    difficulty: Difficulty,
  ) -> Result<ReviewOutcome, SessionError> {
    let (outcome, queued) = {
      let mut state = self.inner.lock_state();
      let previous_interval = get_current_interval(state.baseline.get(&example_id).copied());

      // A plain view never overrides a rating given earlier in the session
      if difficulty == Difficulty::Viewed {
        if let Some(entry) = state.entries.get(&example_id) {
          if entry.result.difficulty.is_persisted() {
            let result = entry.result;
            return Ok(ReviewOutcome {
              example_id,
              difficulty: result.difficulty,
              pending: result.pending,
              previous_interval,
              new_interval: calculate_new_srs_interval(previous_interval, result.difficulty),
            });
          }
        }
      }

      let update = difficulty
        .is_persisted()
        .then(|| PendingFlashcardUpdate::today(example_id, difficulty));
      let result = ReviewedResult {
        example_id,
        difficulty,
        pending: update.is_some(),
      };

      // Must stay under the state lock: requeue_unsaved treats !queued as failed
      let queued = update.map(|update| self.inner.store.upsert(update));

      if !state.entries.contains_key(&example_id) {
        state.order.push(example_id);
      }
      state.entries.insert(
        example_id,
        Entry {
          result,
          update,
          queued: matches!(queued, Some(Ok(()))),
        },
      );

      let outcome = ReviewOutcome {
        example_id,
        difficulty,
        pending: result.pending,
        previous_interval,
        new_interval: calculate_new_srs_interval(previous_interval, difficulty),
      };
      (outcome, queued)
    };

    tracing::debug!(
      "Example {} reviewed as {} (interval {} -> {})",
      example_id,
      difficulty.as_str(),
      outcome.previous_interval,
      outcome.new_interval
    );

    if let Some(Err(e)) = queued {
      tracing::warn!("Failed to queue review of example {}: {}", example_id, e);
      return Err(e.into());
    }

    Ok(outcome)
  }

  pub fn has_example_been_reviewed(&self, example_id: i64) -> Option<Difficulty> {
    self
      .inner
      .lock_state()
      .entries
      .get(&example_id)
      .map(|entry| entry.result.difficulty)
  }

  pub fn reviewed_result(&self, example_id: i64) -> Option<ReviewedResult> {
    self
      .inner
      .lock_state()
      .entries
      .get(&example_id)
      .map(|entry| entry.result)
  }

  /// All results in the order examples were first reviewed
  pub fn reviewed_results(&self) -> Vec<ReviewedResult> {
    let state = self.inner.lock_state();
    state
      .order
      .iter()
      .filter_map(|id| state.entries.get(id).map(|entry| entry.result))
      .collect()
  }

  pub fn pending_count(&self) -> usize {
    self
      .inner
      .lock_state()
      .entries
      .values()
      .filter(|entry| entry.result.pending)
      .count()
  }

  /// Interval to display for an example, including this session's rating
  pub fn current_interval(&self, example_id: i64) -> u32 {
    let state = self.inner.lock_state();
    let baseline = get_current_interval(state.baseline.get(&example_id).copied());
    match state.entries.get(&example_id) {
      Some(entry) => calculate_new_srs_interval(baseline, entry.result.difficulty),
      None => baseline,
    }
  }

  /// Submit every pending record as one batch.
  ///
  /// Only one flush per queue runs at a time; a flush that had to wait takes
  /// its own snapshot afterwards, so nothing is submitted twice. Flushing an
  /// empty queue is a no-op.
  pub async fn flush_batch(&self) -> Result<FlushReport, SessionError> {
    self.inner.flush().await
  }

  /// Start a flush in the background. `None` outside a tokio runtime.
  pub fn spawn_flush(&self) -> Option<JoinHandle<Result<FlushReport, SessionError>>> {
    let handle = tokio::runtime::Handle::try_current().ok()?;
    let inner = Arc::clone(&self.inner);
    Some(handle.spawn(async move { inner.flush().await }))
  }

  /// Tear the session down and fire the final flush.
  ///
  /// The flush is not awaited here; it runs to completion on its own and
  /// applies its result after the session is gone. Returns `None` if the
  /// session already ended or no runtime is available, in which case the
  /// records stay in the durable queue for the next flush.
  pub fn end(&self) -> Option<JoinHandle<Result<FlushReport, SessionError>>> {
    if self.ended.swap(true, Ordering::SeqCst) {
      return None;
    }

    let handle = self.spawn_flush();
    if handle.is_none() {
      tracing::warn!(
        "No async runtime at session end; {} reviews stay queued",
        self.pending_count()
      );
    }
    handle
  }

  pub fn is_ended(&self) -> bool {
    self.ended.load(Ordering::SeqCst)
  }
}

impl<S: ReviewSubmitter> Drop for ReviewSession<S> {
  fn drop(&mut self) {
    if !self.is_ended() {
      let _ = self.end();
    }
  }
}

impl<S: ReviewSubmitter> SessionInner<S> {
  fn lock_state(&self) -> MutexGuard<'_, SessionState> {
    // State is plain bookkeeping, still consistent after a panic elsewhere
    self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// Retry durable writes that failed when the review happened
  fn requeue_unsaved(&self) {
    let mut state = self.lock_state();
    for entry in state.entries.values_mut() {
      if !entry.result.pending || entry.queued {
        continue;
      }
      let Some(update) = entry.update else {
        continue;
      };
      match self.store.upsert(update) {
        Ok(()) => entry.queued = true,
        Err(e) => tracing::warn!(
          "Review of example {} still not queued: {}",
          update.example_id,
          e
        ),
      }
    }
  }

  /// Clear `pending` for queued records that are no longer in the store.
  ///
  /// Leaves every flag alone if the store cannot be read.
  fn reconcile(&self) {
    let remaining = match self.store.try_load() {
      Ok(remaining) => remaining.unwrap_or_default(),
      Err(e) => {
        tracing::warn!("Could not re-read pending queue after flush: {}", e);
        return;
      }
    };
    let mut state = self.lock_state();
    for entry in state.entries.values_mut() {
      if !entry.result.pending || !entry.queued {
        continue;
      }
      if let Some(update) = entry.update {
        if !remaining.contains(&update) {
          entry.result.pending = false;
        }
      }
    }
  }

  async fn flush(&self) -> Result<FlushReport, SessionError> {
    let _gate = self.store.lock_flush().await;
    self.requeue_unsaved();
    let report = flush::submit_snapshot(&self.store, self.submitter.as_ref()).await?;
    self.reconcile();
    Ok(report)
  }
}
