//! Project path functions - single source of truth for file locations.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//!
//! Lets several agents run side by side with isolated queues:
//! ```bash
//! DATA_DIR=data/student-a PORT=3101 cargo run
//! DATA_DIR=data/student-b PORT=3102 cargo run
//! ```

use std::env;
use std::sync::OnceLock;

static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// SQLite file holding the durable review queue
pub fn queue_db_path() -> String {
    format!("{}/review_queue.db", data_dir())
}

/// Optional TOML configuration, read from the working directory
pub const CONFIG_FILE: &str = "config.toml";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_default() {
        // OnceLock initializes once, so only the shape is checked
        assert!(!data_dir().is_empty());
    }

    #[test]
    fn test_queue_db_path_format() {
        assert!(queue_db_path().ends_with("/review_queue.db"));
    }
}
