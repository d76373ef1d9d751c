//! Application state shared by all handlers.

use std::sync::Arc;

use crate::session::SessionRegistry;
use crate::submit::ReviewSubmitter;

pub struct AppState<S: ReviewSubmitter> {
  pub registry: Arc<SessionRegistry<S>>,
  /// Examples drawn per session when the request does not say
  pub default_example_count: usize,
}

impl<S: ReviewSubmitter> AppState<S> {
  pub fn new(registry: Arc<SessionRegistry<S>>, default_example_count: usize) -> Self {
    Self {
      registry,
      default_example_count,
    }
  }
}

impl<S: ReviewSubmitter> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      registry: Arc::clone(&self.registry),
      default_example_count: self.default_example_count,
    }
  }
}
