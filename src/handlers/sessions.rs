//! Review session endpoints.

use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::{Difficulty, ReviewedResult, StudentFlashcard};
use crate::error::SessionError;
use crate::session::FlushReport;
use crate::srs::select_random_subset;
use crate::state::AppState;
use crate::submit::ReviewSubmitter;

// ============================================================================
// Start / End
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
  pub flashcards: Vec<StudentFlashcard>,
  /// How many examples to quiz; all of them if larger than the deck
  pub example_count: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResponse {
  pub session_id: String,
  /// Examples to show, in quiz order
  pub example_ids: Vec<i64>,
}

/// POST /sessions
pub async fn start_session<S: ReviewSubmitter>(
  State(state): State<AppState<S>>,
  Json(request): Json<StartSessionRequest>,
) -> Json<StartSessionResponse> {
  let count = request.example_count.unwrap_or(state.default_example_count);
  let example_ids = select_random_subset(&request.flashcards, count)
    .into_iter()
    .map(|card| card.example_id)
    .collect();

  let (session_id, _) = state.registry.start(&request.flashcards);

  Json(StartSessionResponse {
    session_id,
    example_ids,
  })
}

/// Unmount: the final flush runs in the background.
///
/// DELETE /sessions/{session_id}
pub async fn end_session<S: ReviewSubmitter>(
  State(state): State<AppState<S>>,
  Path(session_id): Path<String>,
) -> Result<StatusCode, SessionError> {
  let _ = state.registry.end(&session_id)?;
  Ok(StatusCode::ACCEPTED)
}

// ============================================================================
// Reviews
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
  pub example_id: i64,
  pub difficulty: Difficulty,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
  pub example_id: i64,
  pub difficulty: Difficulty,
  pub pending: bool,
  pub new_interval: u32,
  /// False when the review could not be written to the durable queue
  pub queued: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub warning: Option<String>,
}

/// POST /sessions/{session_id}/reviews
pub async fn record_review<S: ReviewSubmitter>(
  State(state): State<AppState<S>>,
  Path(session_id): Path<String>,
  Json(request): Json<ReviewRequest>,
) -> Response {
  match state
    .registry
    .record_review(&session_id, request.example_id, request.difficulty)
  {
    Ok(outcome) => Json(ReviewResponse {
      example_id: outcome.example_id,
      difficulty: outcome.difficulty,
      pending: outcome.pending,
      new_interval: outcome.new_interval,
      queued: true,
      warning: None,
    })
    .into_response(),
    Err(SessionError::Storage(e)) => {
      // Progress is kept in memory; the queue write is retried on next flush
      let Some(session) = state.registry.get(&session_id) else {
        return SessionError::NotFound(session_id).into_response();
      };
      let Some(result) = session.reviewed_result(request.example_id) else {
        return SessionError::Storage(e).into_response();
      };
      Json(ReviewResponse {
        example_id: result.example_id,
        difficulty: result.difficulty,
        pending: result.pending,
        new_interval: session.current_interval(request.example_id),
        queued: false,
        warning: Some(e.to_string()),
      })
      .into_response()
    }
    Err(e) => e.into_response(),
  }
}

/// GET /sessions/{session_id}/reviews
pub async fn list_reviews<S: ReviewSubmitter>(
  State(state): State<AppState<S>>,
  Path(session_id): Path<String>,
) -> Result<Json<Vec<ReviewedResult>>, SessionError> {
  let session = state
    .registry
    .get(&session_id)
    .ok_or(SessionError::NotFound(session_id))?;
  Ok(Json(session.reviewed_results()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStatusResponse {
  pub example_id: i64,
  pub difficulty: Option<Difficulty>,
}

/// GET /sessions/{session_id}/reviews/{example_id}
pub async fn get_review<S: ReviewSubmitter>(
  State(state): State<AppState<S>>,
  Path((session_id, example_id)): Path<(String, i64)>,
) -> Result<Json<ReviewStatusResponse>, SessionError> {
  let session = state
    .registry
    .get(&session_id)
    .ok_or(SessionError::NotFound(session_id))?;
  Ok(Json(ReviewStatusResponse {
    example_id,
    difficulty: session.has_example_been_reviewed(example_id),
  }))
}

// ============================================================================
// Flush
// ============================================================================

/// POST /sessions/{session_id}/flush
pub async fn flush_session<S: ReviewSubmitter>(
  State(state): State<AppState<S>>,
  Path(session_id): Path<String>,
) -> Result<Json<FlushReport>, SessionError> {
  let report = state.registry.flush(&session_id).await?;
  Ok(Json(report))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::handlers::router;
  use crate::session::SessionRegistry;
  use crate::storage::MemoryStore;
  use crate::testing::{pending_store, MockSubmitter};
  use axum_test::TestServer;
  use serde_json::{json, Value};
  use std::sync::Arc;

  struct Harness {
    server: TestServer,
    submitter: Arc<MockSubmitter>,
    kv: Arc<MemoryStore>,
  }

  fn harness() -> Harness {
    let (kv, store) = pending_store();
    let submitter = Arc::new(MockSubmitter::new());
    let registry = Arc::new(SessionRegistry::new(store, submitter.clone(), 0));
    let server = TestServer::new(router(AppState::new(registry, 20))).unwrap();
    Harness {
      server,
      submitter,
      kv,
    }
  }

  async fn start(server: &TestServer) -> String {
    let response = server
      .post("/sessions")
      .json(&json!({
        "flashcards": [
          {"exampleId": 101, "srsInterval": 3},
          {"exampleId": 102, "srsInterval": 2},
          {"exampleId": 103}
        ],
        "exampleCount": 2
      }))
      .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["exampleIds"].as_array().unwrap().len(), 2);
    body["sessionId"].as_str().unwrap().to_string()
  }

  #[tokio::test]
  async fn test_review_and_lookup() {
    let h = harness();
    let id = start(&h.server).await;

    let response = h
      .server
      .post(&format!("/sessions/{}/reviews", id))
      .json(&json!({"exampleId": 101, "difficulty": "easy"}))
      .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["newInterval"], 4);
    assert_eq!(body["pending"], true);
    assert_eq!(body["queued"], true);

    let status: Value = h
      .server
      .get(&format!("/sessions/{}/reviews/101", id))
      .await
      .json();
    assert_eq!(status["difficulty"], "easy");

    let unreviewed: Value = h
      .server
      .get(&format!("/sessions/{}/reviews/102", id))
      .await
      .json();
    assert_eq!(unreviewed["difficulty"], Value::Null);
  }

  #[tokio::test]
  async fn test_unknown_difficulty_rejected() {
    let h = harness();
    let id = start(&h.server).await;

    let response = h
      .server
      .post(&format!("/sessions/{}/reviews", id))
      .json(&json!({"exampleId": 101, "difficulty": "medium"}))
      .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn test_unknown_session_is_404() {
    let h = harness();
    h.server
      .post("/sessions/missing/reviews")
      .json(&json!({"exampleId": 1, "difficulty": "hard"}))
      .await
      .assert_status(StatusCode::NOT_FOUND);
    h.server
      .delete("/sessions/missing")
      .await
      .assert_status(StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn test_flush_endpoint() {
    let h = harness();
    let id = start(&h.server).await;
    h.server
      .post(&format!("/sessions/{}/reviews", id))
      .json(&json!({"exampleId": 102, "difficulty": "hard"}))
      .await
      .assert_status_ok();

    let pending: Value = h.server.get("/pending").await.json();
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let report: Value = h.server.post(&format!("/sessions/{}/flush", id)).await.json();
    assert_eq!(report["status"], "flushed");
    assert_eq!(report["submitted"], 1);

    let pending: Value = h.server.get("/pending").await.json();
    assert!(pending.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_flush_failure_is_bad_gateway() {
    let h = harness();
    let id = start(&h.server).await;
    h.server
      .post(&format!("/sessions/{}/reviews", id))
      .json(&json!({"exampleId": 101, "difficulty": "easy"}))
      .await
      .assert_status_ok();

    h.submitter.set_fail(true);
    h.server
      .post(&format!("/sessions/{}/flush", id))
      .await
      .assert_status(StatusCode::BAD_GATEWAY);

    let reviews: Value = h.server.get(&format!("/sessions/{}/reviews", id)).await.json();
    assert_eq!(reviews[0]["pending"], true);
  }

  #[tokio::test]
  async fn test_storage_failure_still_records_progress() {
    let h = harness();
    let id = start(&h.server).await;

    h.kv.set_fail_writes(true);
    let response = h
      .server
      .post(&format!("/sessions/{}/reviews", id))
      .json(&json!({"exampleId": 101, "difficulty": "easy"}))
      .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["queued"], false);
    assert_eq!(body["newInterval"], 4);
    assert!(body["warning"].is_string());
  }

  #[tokio::test]
  async fn test_end_session_fires_final_flush() {
    let h = harness();
    let id = start(&h.server).await;
    h.server
      .post(&format!("/sessions/{}/reviews", id))
      .json(&json!({"exampleId": 101, "difficulty": "easy"}))
      .await
      .assert_status_ok();

    h.server
      .delete(&format!("/sessions/{}", id))
      .await
      .assert_status(StatusCode::ACCEPTED);

    for _ in 0..200 {
      if h.submitter.call_count() > 0 {
        break;
      }
      tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    assert_eq!(h.submitter.call_count(), 1);

    h.server
      .get(&format!("/sessions/{}/reviews", id))
      .await
      .assert_status(StatusCode::NOT_FOUND);
  }
}
