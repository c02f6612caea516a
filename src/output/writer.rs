//! Sink implementations

use super::RecordSink;
use crate::error::Result;
use crate::types::{JsonObject, JsonValue};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use std::io::Write;

// ============================================================================
// Message Writer
// ============================================================================

/// Line-delimited message writer over any [`Write`] target
///
/// Produces the Singer message framing: each line is a self-describing JSON
/// object with a `type` discriminator.
pub struct MessageWriter<W: Write> {
    out: W,
}

impl<W: Write> MessageWriter<W> {
    /// Create a writer over the given output
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the writer, returning the underlying output
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_message(&mut self, message: &JsonValue) -> Result<()> {
        serde_json::to_writer(&mut self.out, message)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}

impl MessageWriter<std::io::Stdout> {
    /// Create a writer over stdout
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> RecordSink for MessageWriter<W> {
    fn schema(
        &mut self,
        stream: &str,
        schema: &JsonValue,
        key_properties: &[&str],
        bookmark_property: Option<&str>,
    ) -> Result<()> {
        let mut message = json!({
            "type": "SCHEMA",
            "stream": stream,
            "schema": schema,
            "key_properties": key_properties,
        });
        if let Some(bookmark) = bookmark_property {
            message["bookmark_properties"] = json!([bookmark]);
        }
        self.write_message(&message)
    }

    fn record(&mut self, stream: &str, record: &JsonObject) -> Result<()> {
        let message = json!({
            "type": "RECORD",
            "stream": stream,
            "record": record,
            "time_extracted": Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        });
        self.write_message(&message)
    }

    fn state(&mut self, value: &JsonValue) -> Result<()> {
        let message = json!({
            "type": "STATE",
            "value": value,
        });
        self.write_message(&message)
    }
}

// ============================================================================
// Collecting Sink
// ============================================================================

/// In-memory sink that keeps everything it receives
///
/// Used by tests and by the `read --dry-run` path to inspect emission without
/// producing output.
#[derive(Debug, Default)]
pub struct CollectingSink {
    /// Emitted records as (stream, record) pairs, in emission order
    pub records: Vec<(String, JsonObject)>,
    /// Streams whose schema was announced, in order
    pub schemas: Vec<String>,
    /// Emitted state values, in order
    pub states: Vec<JsonValue>,
}

impl CollectingSink {
    /// Create an empty collecting sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Records emitted for one stream
    pub fn records_for(&self, stream: &str) -> Vec<&JsonObject> {
        self.records
            .iter()
            .filter(|(name, _)| name == stream)
            .map(|(_, record)| record)
            .collect()
    }
}

impl RecordSink for CollectingSink {
    fn schema(
        &mut self,
        stream: &str,
        _schema: &JsonValue,
        _key_properties: &[&str],
        _bookmark_property: Option<&str>,
    ) -> Result<()> {
        self.schemas.push(stream.to_string());
        Ok(())
    }

    fn record(&mut self, stream: &str, record: &JsonObject) -> Result<()> {
        self.records.push((stream.to_string(), record.clone()));
        Ok(())
    }

    fn state(&mut self, value: &JsonValue) -> Result<()> {
        self.states.push(value.clone());
        Ok(())
    }
}
