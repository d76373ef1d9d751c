use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flashcard_review::config::{Config, DEFAULT_SESSION_EXAMPLE_COUNT};
use flashcard_review::session::SessionRegistry;
use flashcard_review::state::AppState;
use flashcard_review::storage::{PendingUpdateStore, SqliteStore};
use flashcard_review::submit::HttpSubmitter;
use flashcard_review::{db, handlers, profiling};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "flashcard_review=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  // Initialize profiling (no-op if feature disabled)
  profiling::init();

  let config = Config::load();

  let pool = if config.uses_memory_storage() {
    tracing::warn!("Review queue is in memory; unsent reviews are lost on exit");
    db::init_memory_db()
  } else {
    tracing::info!("Review queue at {}", config.storage_path.display());
    db::init_db(&config.storage_path)
  }
  .expect("Failed to initialize review queue");

  let store = PendingUpdateStore::with_key(
    Arc::new(SqliteStore::new(pool)),
    config.persistence_key.clone(),
  );
  if !store.is_empty() {
    tracing::info!("{} reviews left from a previous run", store.len());
  }

  let submitter = HttpSubmitter::new(
    &config.remote_base_url,
    config.remote_token.clone(),
    config.remote_timeout,
  )
  .expect("Failed to build HTTP client");
  tracing::info!("Submitting reviews to {}", submitter.endpoint());

  let registry = Arc::new(SessionRegistry::new(
    store,
    Arc::new(submitter),
    config.flush_batch_size,
  ));

  // Periodic flush; also drains leftovers when no session is open
  match config.flush_interval {
    Some(period) => {
      let flusher = Arc::clone(&registry);
      tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
          ticker.tick().await;
          let submitted = flusher.flush_all().await;
          if submitted > 0 {
            tracing::debug!("Periodic flush submitted {} reviews", submitted);
          }
        }
      });
    }
    None => tracing::info!("Periodic flush disabled"),
  }

  let app = handlers::router(AppState::new(
    Arc::clone(&registry),
    DEFAULT_SESSION_EXAMPLE_COUNT,
  ));

  let bind_addr = config.server_bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Review agent running on http://localhost:{}", config.server_port);

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server failed to start");

  // Final flush for whatever is still queued
  let submitted = registry.flush_all().await;
  tracing::info!("Flushed {} reviews on shutdown", submitted);
  profiling::shutdown();
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!("Failed to listen for shutdown signal: {}", e);
  }
}
