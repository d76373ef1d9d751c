use axum::{extract::State, Json};

use crate::domain::PendingFlashcardUpdate;
use crate::state::AppState;
use crate::submit::ReviewSubmitter;

/// Everything waiting in the durable queue.
///
/// GET /pending
pub async fn list_pending<S: ReviewSubmitter>(
  State(state): State<AppState<S>>,
) -> Json<Vec<PendingFlashcardUpdate>> {
  Json(state.registry.store().load().unwrap_or_default())
}
