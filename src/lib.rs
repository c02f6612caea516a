//! # tap-iterable
//!
//! A Rust-native Singer-style extractor for the Iterable marketing API.
//!
//! The tap models each API entity as a declared stream: a paginated,
//! optionally incremental, optionally hierarchical sequence of records.
//! Parents hand context down to dependent streams, responses in three shapes
//! (JSON documents, newline-delimited JSON, raw text lines) normalize into a
//! uniform record stream, and the high-volume export endpoint stages its
//! unbounded body through a scoped disk buffer instead of memory.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tap_iterable::config::TapConfig;
//! use tap_iterable::engine::SyncEngine;
//! use tap_iterable::http::{HttpClient, HttpClientConfig};
//! use tap_iterable::output::MessageWriter;
//! use tap_iterable::state::StateManager;
//!
//! #[tokio::main]
//! async fn main() -> tap_iterable::Result<()> {
//!     let config = TapConfig::from_file("config.json")?;
//!     let client = HttpClient::with_config(
//!         HttpClientConfig::builder()
//!             .base_url(config.base_url())
//!             .api_key(&config.api_key)
//!             .build(),
//!     );
//!
//!     let mut engine = SyncEngine::new(
//!         client,
//!         StateManager::in_memory(),
//!         config,
//!         MessageWriter::stdout(),
//!     );
//!     engine.run(None).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         SyncEngine                           │
//! │   registry walk → context fan-out → paginated fetch loop     │
//! └──────────────────────────────────────────────────────────────┘
//!               │
//! ┌─────────┬───┴──────┬────────────┬────────────┬──────────────┐
//! │  HTTP   │ Paginate │   Decode   │ Normalize  │    Output    │
//! ├─────────┼──────────┼────────────┼────────────┼──────────────┤
//! │ Api-Key │ PageToken│ JSON path  │ epoch ms   │ SCHEMA       │
//! │ Retry   │ Disabled │ NDJSON     │ tx data    │ RECORD       │
//! │ Pacing  │          │ Raw lines  │ dataFields │ STATE        │
//! └─────────┴──────────┴────────────┴────────────┴──────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Tap configuration and region selection
pub mod config;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Response decoders (JSON, NDJSON, raw lines)
pub mod decode;

/// Schema-driven record normalization
pub mod normalize;

/// Stream invocation contexts
pub mod context;

/// Path template interpolation
pub mod template;

/// Stream declarations and registry
pub mod streams;

/// Replication state and bookmarks
pub mod state;

/// Output boundary (line-delimited messages)
pub mod output;

/// Bulk export staging
pub mod export;

/// Main extraction engine
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
