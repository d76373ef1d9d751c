use serde::{Deserialize, Serialize};

/// A student's relationship to one example, as known when a session starts.
///
/// The backend owns `srs_interval`; the local copy only feeds optimistic display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentFlashcard {
  pub example_id: i64,
  #[serde(default)]
  pub srs_interval: Option<u32>,
}

impl StudentFlashcard {
  pub fn new(example_id: i64, srs_interval: Option<u32>) -> Self {
    Self {
      example_id,
      srs_interval,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_deserialize_without_interval() {
    let card: StudentFlashcard = serde_json::from_str(r#"{"exampleId": 7}"#).unwrap();
    assert_eq!(card, StudentFlashcard::new(7, None));
  }

  #[test]
  fn test_deserialize_with_interval() {
    let card: StudentFlashcard =
      serde_json::from_str(r#"{"exampleId": 7, "srsInterval": 3}"#).unwrap();
    assert_eq!(card.srs_interval, Some(3));
  }
}
