//! Error types for review bookkeeping and sync.

use thiserror::Error;

/// Failures of the durable key-value layer
#[derive(Error, Debug)]
pub enum StorageError {
  #[error("Database error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("Serialization error: {0}")]
  Json(#[from] serde_json::Error),

  /// The store refused a write (quota, read-only media, injected fault)
  #[error("Write rejected: {0}")]
  WriteRejected(String),

  /// The store could not be read (busy, I/O error, injected fault)
  #[error("Read failed: {0}")]
  ReadFailed(String),

  #[error("Storage unavailable")]
  Lock,

  #[error("File I/O error: {0}")]
  Io(#[from] std::io::Error),
}

/// Failures talking to the remote submission endpoint
#[derive(Error, Debug)]
pub enum SubmitError {
  #[error("Transport error: {0}")]
  Transport(#[from] reqwest::Error),

  /// Backend answered but did not accept the batch
  #[error("Batch rejected with status {0}")]
  Rejected(u16),

  #[error("Submission failed: {0}")]
  Other(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
  #[error(transparent)]
  Storage(#[from] StorageError),

  #[error(transparent)]
  Submit(#[from] SubmitError),

  #[error("Session not found: {0}")]
  NotFound(String),
}
