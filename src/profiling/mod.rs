//! Optional timing of storage access and flushes.
//!
//! Built with `--features profiling`, events go to a JSONL file in the data
//! directory. Without the feature the macros expand to nothing (or to the bare
//! block) and `init`/`shutdown` are empty.

#[cfg(feature = "profiling")]
mod event;
#[cfg(feature = "profiling")]
mod logger;

#[cfg(feature = "profiling")]
pub use event::*;
#[cfg(feature = "profiling")]
pub use logger::*;

#[cfg(not(feature = "profiling"))]
mod noop;
#[cfg(not(feature = "profiling"))]
pub use noop::*;

/// Record one [`EventType`] value, e.g. `profile_log!(EventType::Flush { .. })`.
#[cfg(feature = "profiling")]
#[macro_export]
macro_rules! profile_log {
    ($event_type:expr) => {
        $crate::profiling::log_event($event_type)
    };
}

#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_log {
    ($($args:tt)*) => {};
}

/// Evaluate `$body` and record how long it took under `$name`.
#[cfg(feature = "profiling")]
#[macro_export]
macro_rules! profile_scope {
    ($name:expr, $body:block) => {{
        let started = std::time::Instant::now();
        let value = $body;
        $crate::profiling::log_timed($name, started.elapsed());
        value
    }};
}

#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_scope {
    ($name:expr, $body:block) => {
        $body
    };
}
