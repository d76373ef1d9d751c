pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod paths;
pub mod profiling;
pub mod session;
pub mod srs;
pub mod state;
pub mod storage;
pub mod submit;

#[cfg(test)]
pub mod testing;
