use crate::domain::Difficulty;

/// Calculate the next review interval after a rating.
///
/// Easy grows the interval by one step, hard shrinks it by one step and
/// bottoms out at zero. Viewed leaves it as is.
pub fn calculate_new_srs_interval(current_interval: u32, difficulty: Difficulty) -> u32 {
  match difficulty {
    Difficulty::Easy => current_interval.saturating_add(1),
    Difficulty::Hard => current_interval.saturating_sub(1),
    Difficulty::Viewed => current_interval,
  }
}

/// A flashcard that has never been scheduled starts at interval 0
pub fn get_current_interval(srs_interval: Option<u32>) -> u32 {
  srs_interval.unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_easy_increments() {
    for n in [0, 1, 2, 3, 10, 365] {
      assert_eq!(calculate_new_srs_interval(n, Difficulty::Easy), n + 1);
    }
  }

  #[test]
  fn test_hard_decrements() {
    assert_eq!(calculate_new_srs_interval(5, Difficulty::Hard), 4);
    assert_eq!(calculate_new_srs_interval(2, Difficulty::Hard), 1);
  }

  #[test]
  fn test_hard_never_negative() {
    assert_eq!(calculate_new_srs_interval(1, Difficulty::Hard), 0);
    assert_eq!(calculate_new_srs_interval(0, Difficulty::Hard), 0);
  }

  #[test]
  fn test_viewed_keeps_interval() {
    assert_eq!(calculate_new_srs_interval(4, Difficulty::Viewed), 4);
  }

  #[test]
  fn test_easy_saturates() {
    assert_eq!(calculate_new_srs_interval(u32::MAX, Difficulty::Easy), u32::MAX);
  }

  #[test]
  fn test_missing_interval_defaults_to_zero() {
    assert_eq!(get_current_interval(None), 0);
    assert_eq!(get_current_interval(Some(3)), 3);
  }

  #[test]
  fn test_repeated_easy_then_hard() {
    let mut interval = get_current_interval(None);
    for _ in 0..3 {
      interval = calculate_new_srs_interval(interval, Difficulty::Easy);
    }
    assert_eq!(interval, 3);
    for _ in 0..5 {
      interval = calculate_new_srs_interval(interval, Difficulty::Hard);
    }
    assert_eq!(interval, 0);
  }
}
