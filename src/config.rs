//! Application configuration.
//!
//! Every value is resolved with the priority `config.toml` > environment
//! (including `.env`) > built-in default.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::paths;
use crate::storage::DEFAULT_PERSISTENCE_KEY;

// ==================== File Format ====================

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    storage: Option<StorageSection>,
    remote: Option<RemoteSection>,
    sync: Option<SyncSection>,
    server: Option<ServerSection>,
}

#[derive(Debug, Default, Deserialize)]
struct StorageSection {
    path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RemoteSection {
    base_url: Option<String>,
    token: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SyncSection {
    flush_interval_secs: Option<u64>,
    flush_batch_size: Option<usize>,
    persistence_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    port: Option<u16>,
}

// ==================== Defaults ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

pub const DEFAULT_SERVER_PORT: u16 = 3100;

pub const DEFAULT_REMOTE_BASE_URL: &str = "http://localhost:8000/api";

pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;

/// Storage path that keeps the queue in memory only
pub const MEMORY_STORAGE_PATH: &str = ":memory:";

/// Seconds between periodic flushes of every live session. 0 disables them.
pub const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 60;

/// Pending reviews in one session that trigger an early flush
pub const DEFAULT_FLUSH_BATCH_SIZE: usize = 20;

/// Examples drawn for a session when the client does not ask for a count
pub const DEFAULT_SESSION_EXAMPLE_COUNT: usize = 20;

// ==================== Resolved Config ====================

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub storage_path: PathBuf,
    pub remote_base_url: String,
    pub remote_token: Option<String>,
    pub remote_timeout: Duration,
    /// `None` when periodic flushing is disabled
    pub flush_interval: Option<Duration>,
    pub flush_batch_size: usize,
    pub persistence_key: String,
    pub server_port: u16,
}

impl Config {
    /// Load from `config.toml` and the process environment
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        let contents = std::fs::read_to_string(paths::CONFIG_FILE).ok();
        Self::from_sources(contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// Resolve from optional TOML text and an environment lookup
    pub fn from_sources(toml_text: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Self {
        let file = toml_text
            .and_then(|text| match toml::from_str::<FileConfig>(text) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Ignoring malformed {}: {}", paths::CONFIG_FILE, e);
                    None
                }
            })
            .unwrap_or_default();

        let storage = file.storage.unwrap_or_default();
        let remote = file.remote.unwrap_or_default();
        let sync = file.sync.unwrap_or_default();
        let server = file.server.unwrap_or_default();

        let parsed = |key: &str| env(key).and_then(|v| v.parse::<u64>().ok());

        let storage_path = storage
            .path
            .or_else(|| env("STORAGE_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(paths::queue_db_path()));

        Self {
            storage_path,
            remote_base_url: remote
                .base_url
                .or_else(|| env("REMOTE_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_REMOTE_BASE_URL.to_string()),
            remote_token: remote.token.or_else(|| env("REMOTE_TOKEN")),
            remote_timeout: Duration::from_secs(
                remote
                    .timeout_secs
                    .or_else(|| parsed("REMOTE_TIMEOUT_SECS"))
                    .unwrap_or(DEFAULT_REMOTE_TIMEOUT_SECS),
            ),
            flush_interval: Some(
                sync.flush_interval_secs
                    .or_else(|| parsed("FLUSH_INTERVAL_SECS"))
                    .unwrap_or(DEFAULT_FLUSH_INTERVAL_SECS),
            )
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs),
            flush_batch_size: sync
                .flush_batch_size
                .or_else(|| parsed("FLUSH_BATCH_SIZE").map(|v| v as usize))
                .unwrap_or(DEFAULT_FLUSH_BATCH_SIZE),
            persistence_key: sync
                .persistence_key
                .or_else(|| env("PERSISTENCE_KEY"))
                .unwrap_or_else(|| DEFAULT_PERSISTENCE_KEY.to_string()),
            server_port: server
                .port
                .or_else(|| env("PORT").and_then(|v| v.parse().ok()))
                .unwrap_or(DEFAULT_SERVER_PORT),
        }
    }

    /// Whether the queue should live in a throwaway in-memory database
    pub fn uses_memory_storage(&self) -> bool {
        self.storage_path.as_os_str() == MEMORY_STORAGE_PATH
    }

    /// Get the full server bind address
    pub fn server_bind_addr(&self) -> String {
        format!("{}:{}", SERVER_ADDR, self.server_port)
    }
}
