//! Engine configuration and statistics

use std::path::PathBuf;

/// Configuration for a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Abort the whole run on the first stream failure instead of
    /// continuing with the remaining streams
    pub fail_fast: bool,
    /// Root directory for export staging files (system temp dir if unset)
    pub staging_dir: Option<PathBuf>,
}

impl SyncConfig {
    /// Create a new sync config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set fail fast mode
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set the export staging root
    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }
}

/// Statistics from a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Total records emitted
    pub records_emitted: usize,
    /// Total pages fetched
    pub pages_fetched: usize,
    /// Top-level streams completed
    pub streams_synced: usize,
    /// Stream failures encountered
    pub errors: usize,
    /// Run duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an emitted record
    pub fn add_record(&mut self) {
        self.records_emitted += 1;
    }

    /// Count a fetched page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Count a completed stream
    pub fn add_stream(&mut self) {
        self.streams_synced += 1;
    }

    /// Count a stream failure
    pub fn add_error(&mut self) {
        self.errors += 1;
    }

    /// Set run duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
