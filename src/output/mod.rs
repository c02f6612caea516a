//! Output boundary
//!
//! Emits Singer-style `SCHEMA`/`RECORD`/`STATE` messages, one JSON object per
//! line, behind the [`RecordSink`] trait so the engine never knows what is on
//! the other side. The CLI wires stdout in; tests wire a collecting sink.

mod writer;

pub use writer::{CollectingSink, MessageWriter};

use crate::error::Result;
use crate::types::{JsonObject, JsonValue};

/// Destination for extracted records and replication state
pub trait RecordSink {
    /// Announce a stream's schema before its first record
    fn schema(
        &mut self,
        stream: &str,
        schema: &JsonValue,
        key_properties: &[&str],
        bookmark_property: Option<&str>,
    ) -> Result<()>;

    /// Emit one normalized record
    fn record(&mut self, stream: &str, record: &JsonObject) -> Result<()>;

    /// Emit the current replication state
    fn state(&mut self, value: &JsonValue) -> Result<()>;
}
