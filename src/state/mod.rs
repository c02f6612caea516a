//! Replication state
//!
//! Tracks the per-stream replication-key high-water mark ("bookmark") that
//! makes incremental extraction resumable, and persists it between runs.

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{State, StreamState};
