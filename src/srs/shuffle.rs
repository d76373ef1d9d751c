//! Unbiased shuffling for picking which examples a quiz shows.

use rand::Rng;

/// Return a uniformly random permutation of `items`, leaving the input untouched.
pub fn fisher_yates_shuffle<T: Clone>(items: &[T]) -> Vec<T> {
  let mut rng = rand::rng();
  fisher_yates_shuffle_with(items, &mut rng)
}

/// Same as [`fisher_yates_shuffle`] but draws from the given generator.
pub fn fisher_yates_shuffle_with<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
  let mut shuffled = items.to_vec();
  for i in (1..shuffled.len()).rev() {
    let j = rng.random_range(0..=i);
    shuffled.swap(i, j);
  }
  shuffled
}

/// Pick up to `count` items in random order
pub fn select_random_subset<T: Clone>(items: &[T], count: usize) -> Vec<T> {
  let mut rng = rand::rng();
  select_random_subset_with(items, count, &mut rng)
}

pub fn select_random_subset_with<T: Clone, R: Rng + ?Sized>(
  items: &[T],
  count: usize,
  rng: &mut R,
) -> Vec<T> {
  let mut shuffled = fisher_yates_shuffle_with(items, rng);
  shuffled.truncate(count);
  shuffled
}
