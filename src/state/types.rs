//! State types for tracking replication progress
//!
//! These types are serialized to JSON and persisted between runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete state for a tap run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    /// Per-stream state
    #[serde(default)]
    pub bookmarks: HashMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the bookmark for a stream
    pub fn get_bookmark(&self, stream: &str) -> Option<&str> {
        self.bookmarks
            .get(stream)?
            .replication_key_value
            .as_deref()
    }

    /// Advance the bookmark for a stream, keeping it monotonically
    /// non-decreasing
    ///
    /// Bookmark values are RFC 3339 timestamps, which order lexicographically,
    /// so a plain string comparison is the correct monotonicity check.
    pub fn advance_bookmark(&mut self, stream: &str, value: &str) {
        let entry = self.bookmarks.entry(stream.to_string()).or_default();
        match &entry.replication_key_value {
            Some(current) if current.as_str() >= value => {}
            _ => entry.replication_key_value = Some(value.to_string()),
        }
    }
}

/// State for a single stream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamState {
    /// Replication-key high-water mark
    #[serde(default)]
    pub replication_key_value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_default() {
        let state = State::new();
        assert!(state.bookmarks.is_empty());
        assert!(state.get_bookmark("campaigns").is_none());
    }

    #[test]
    fn test_advance_bookmark() {
        let mut state = State::new();

        state.advance_bookmark("campaigns", "2024-01-01T00:00:00+00:00");
        assert_eq!(
            state.get_bookmark("campaigns"),
            Some("2024-01-01T00:00:00+00:00")
        );

        state.advance_bookmark("campaigns", "2024-02-01T00:00:00+00:00");
        assert_eq!(
            state.get_bookmark("campaigns"),
            Some("2024-02-01T00:00:00+00:00")
        );
    }

    #[test]
    fn test_bookmark_never_regresses() {
        let mut state = State::new();
        state.advance_bookmark("campaigns", "2024-02-01T00:00:00+00:00");
        state.advance_bookmark("campaigns", "2024-01-15T00:00:00+00:00");

        assert_eq!(
            state.get_bookmark("campaigns"),
            Some("2024-02-01T00:00:00+00:00")
        );
    }

    #[test]
    fn test_state_serialization() {
        let mut state = State::new();
        state.advance_bookmark("templates", "2024-03-01T12:00:00+00:00");

        let json = serde_json::to_string(&state).unwrap();
        let restored: State = serde_json::from_str(&json).unwrap();

        assert_eq!(
            restored.get_bookmark("templates"),
            Some("2024-03-01T12:00:00+00:00")
        );
    }
}
