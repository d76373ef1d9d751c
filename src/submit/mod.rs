//! Remote submission of pending review batches.

pub mod http;

use std::future::Future;

use crate::domain::PendingFlashcardUpdate;
use crate::error::SubmitError;

pub use http::HttpSubmitter;

/// Delivers one batch of review outcomes to the backend.
///
/// The outcome is all-or-nothing: `Ok` means the whole batch was accepted.
pub trait ReviewSubmitter: Send + Sync + 'static {
  fn submit(
    &self,
    batch: &[PendingFlashcardUpdate],
  ) -> impl Future<Output = Result<(), SubmitError>> + Send;
}
