//! Batch submission over HTTP

use std::time::Duration;

use serde::Serialize;

use super::ReviewSubmitter;
use crate::domain::PendingFlashcardUpdate;
use crate::error::SubmitError;

/// Path appended to the configured backend base URL
pub const BATCH_REVIEW_PATH: &str = "student-flashcards/batch-review";

#[derive(Debug, Serialize)]
struct BatchReviewRequest<'a> {
  updates: &'a [PendingFlashcardUpdate],
}

/// Posts batches as JSON to the backend's batch review endpoint.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
  client: reqwest::Client,
  endpoint: String,
  token: Option<String>,
}

impl HttpSubmitter {
  pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, SubmitError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      endpoint: format!("{}/{}", base_url.trim_end_matches('/'), BATCH_REVIEW_PATH),
      token,
    })
  }

  pub fn endpoint(&self) -> &str {
    &self.endpoint
  }
}

impl ReviewSubmitter for HttpSubmitter {
  async fn submit(&self, batch: &[PendingFlashcardUpdate]) -> Result<(), SubmitError> {
    let mut request = self
      .client
      .post(&self.endpoint)
      .json(&BatchReviewRequest { updates: batch });
    if let Some(token) = &self.token {
      request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(SubmitError::Rejected(status.as_u16()));
    }

    tracing::debug!("Backend accepted {} flashcard updates", batch.len());
    Ok(())
  }
}
