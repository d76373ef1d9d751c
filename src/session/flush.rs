//! Submitting the durable queue to the backend.

use serde::Serialize;

use crate::domain::PendingFlashcardUpdate;
use crate::error::SessionError;
#[cfg(feature = "profiling")]
use crate::profiling::EventType;
use crate::storage::PendingUpdateStore;
use crate::submit::ReviewSubmitter;

/// What a flush did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FlushReport {
  /// Nothing was pending, no request was made
  Empty,
  Flushed {
    submitted: usize,
    /// Records queued after the snapshot, left for the next flush
    remaining: usize,
  },
}

impl FlushReport {
  pub fn submitted(&self) -> usize {
    match self {
      Self::Empty => 0,
      Self::Flushed { submitted, .. } => *submitted,
    }
  }
}

/// Submit everything currently queued as one batch.
///
/// The caller must hold the store's flush gate. On success exactly the
/// submitted records are removed; on failure the store is left as it was.
/// An unreadable store fails the flush without contacting the backend.
pub(crate) async fn submit_snapshot<S: ReviewSubmitter>(
  store: &PendingUpdateStore,
  submitter: &S,
) -> Result<FlushReport, SessionError> {
  let snapshot: Vec<PendingFlashcardUpdate> = store.try_load()?.unwrap_or_default();
  if snapshot.is_empty() {
    return Ok(FlushReport::Empty);
  }

  tracing::debug!("Flushing {} pending flashcard updates", snapshot.len());

  let result = crate::profile_scope!("flush_submit", { submitter.submit(&snapshot).await });

  #[cfg(feature = "profiling")]
  crate::profile_log!(EventType::Flush {
    batch_size: snapshot.len(),
    accepted: result.is_ok(),
  });

  if let Err(e) = result {
    tracing::warn!(
      "Flush of {} flashcard updates failed, keeping them queued: {}",
      snapshot.len(),
      e
    );
    return Err(e.into());
  }

  let remaining = store.remove_flushed(&snapshot)?;
  tracing::info!(
    "Flushed {} flashcard updates ({} still pending)",
    snapshot.len(),
    remaining
  );

  Ok(FlushReport::Flushed {
    submitted: snapshot.len(),
    remaining,
  })
}

/// Flush a queue that may have no live session attached, e.g. leftovers
/// from a previous run.
pub async fn flush_store<S: ReviewSubmitter>(
  store: &PendingUpdateStore,
  submitter: &S,
) -> Result<FlushReport, SessionError> {
  let _gate = store.lock_flush().await;
  submit_snapshot(store, submitter).await
}
