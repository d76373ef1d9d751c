use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// How the student rated an example during review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  Hard,
  /// Seen but not rated. Never changes the interval, never queued for sync.
  Viewed,
}

impl Difficulty {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Easy => "easy",
      Self::Hard => "hard",
      Self::Viewed => "viewed",
    }
  }

  /// Returns true if a review with this difficulty must reach the backend
  pub fn is_persisted(&self) -> bool {
    matches!(self, Self::Easy | Self::Hard)
  }
}

/// A review outcome recorded locally but not yet accepted by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingFlashcardUpdate {
  pub example_id: i64,
  pub difficulty: Difficulty,
  /// Client-side calendar date of the review, `YYYY-MM-DD`
  pub last_reviewed_date: NaiveDate,
}

impl PendingFlashcardUpdate {
  pub fn new(example_id: i64, difficulty: Difficulty, last_reviewed_date: NaiveDate) -> Self {
    Self {
      example_id,
      difficulty,
      last_reviewed_date,
    }
  }

  /// Create an update dated today in the local timezone
  pub fn today(example_id: i64, difficulty: Difficulty) -> Self {
    Self::new(example_id, difficulty, Local::now().date_naive())
  }
}

/// Per-example review state held for the lifetime of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedResult {
  pub example_id: i64,
  pub difficulty: Difficulty,
  pub pending: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_difficulty_serde_lowercase() {
    let easy: Difficulty = serde_json::from_str("\"easy\"").unwrap();
    assert_eq!(easy, Difficulty::Easy);
    assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), "\"hard\"");
    assert!(serde_json::from_str::<Difficulty>("\"Easy\"").is_err());
  }

  #[test]
  fn test_difficulty_as_str_matches_serde() {
    for difficulty in [Difficulty::Easy, Difficulty::Hard, Difficulty::Viewed] {
      let json = serde_json::to_string(&difficulty).unwrap();
      assert_eq!(json, format!("\"{}\"", difficulty.as_str()));
    }
    assert!(serde_json::from_str::<Difficulty>("\"medium\"").is_err());
  }

  #[test]
  fn test_only_rated_difficulties_persist() {
    assert!(Difficulty::Easy.is_persisted());
    assert!(Difficulty::Hard.is_persisted());
    assert!(!Difficulty::Viewed.is_persisted());
  }

  #[test]
  fn test_pending_update_json_shape() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    let update = PendingFlashcardUpdate::new(101, Difficulty::Easy, date);
    let json = serde_json::to_value(update).unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "exampleId": 101,
        "difficulty": "easy",
        "lastReviewedDate": "2024-03-09"
      })
    );
  }
}
