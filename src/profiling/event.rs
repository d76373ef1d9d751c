//! Event types for profiling.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One JSONL line: timestamp, event, and a duration for timed scopes.
#[derive(Serialize)]
pub struct ProfileEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    /// Duration in microseconds (for timed events)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_us: Option<u64>,
}

impl ProfileEvent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            duration_us: None,
        }
    }

    pub fn with_duration(event_type: EventType, duration: std::time::Duration) -> Self {
        Self {
            duration_us: Some(duration.as_micros() as u64),
            ..Self::new(event_type)
        }
    }
}

/// What happened.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventType {
    /// Profiler opened its output file
    SessionStart { session_id: String },
    /// Profiler shut down
    SessionEnd { total_events: u64 },

    /// Key-value store access
    StorageOp {
        /// get, set or remove
        operation: String,
        key: String,
    },

    /// A pending batch was submitted to the backend
    Flush { batch_size: usize, accepted: bool },

    /// A timed code block completed
    TimedScope { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_event_serialization() {
        let event = ProfileEvent::new(EventType::Flush {
            batch_size: 3,
            accepted: true,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"flush\""));
        assert!(json.contains("\"batch_size\":3"));
        assert!(!json.contains("duration_us"));
    }

    #[test]
    fn test_timed_event_has_duration() {
        let event = ProfileEvent::with_duration(
            EventType::TimedScope { name: "flush_submit".into() },
            std::time::Duration::from_millis(2),
        );
        assert_eq!(event.duration_us, Some(2000));
    }
}
