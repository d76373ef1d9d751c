//! HTTP surface of the local review agent.

pub mod pending;
pub mod sessions;

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::{delete, get, post},
  Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::error::SessionError;
use crate::state::AppState;
use crate::submit::ReviewSubmitter;

pub use pending::list_pending;
pub use sessions::{
  end_session, flush_session, get_review, list_reviews, record_review, start_session,
};

/// Build the agent's router
pub fn router<S: ReviewSubmitter>(state: AppState<S>) -> Router {
  Router::new()
    .route("/sessions", post(start_session::<S>))
    .route("/sessions/{session_id}", delete(end_session::<S>))
    .route(
      "/sessions/{session_id}/reviews",
      post(record_review::<S>).get(list_reviews::<S>),
    )
    .route("/sessions/{session_id}/reviews/{example_id}", get(get_review::<S>))
    .route("/sessions/{session_id}/flush", post(flush_session::<S>))
    .route("/pending", get(list_pending::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

impl IntoResponse for SessionError {
  fn into_response(self) -> Response {
    let status = match &self {
      SessionError::NotFound(_) => StatusCode::NOT_FOUND,
      SessionError::Submit(_) => StatusCode::BAD_GATEWAY,
      SessionError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
      status,
      Json(serde_json::json!({
        "error": self.to_string()
      })),
    )
      .into_response()
  }
}
