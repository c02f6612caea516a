//! Record normalization
//!
//! Post-processes each raw record before emission. The rules are driven by
//! the stream's declared JSON schema, computed once per stream and cached on
//! its runtime:
//!
//! - schema properties with `"format": "date-time"` holding an integer are
//!   decoded from epoch milliseconds to an RFC 3339 UTC string;
//! - export streams carry a `transactionalData` field that arrives as a
//!   JSON-encoded string and is unpacked in place;
//! - the users export buckets every field absent from the declared schema
//!   into a single `dataFields` object, bounding schema churn from
//!   customer-defined attributes.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, SecondsFormat};
use std::collections::HashSet;

#[cfg(test)]
mod tests;

/// Which shaping rules apply on top of date-time decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordShape {
    /// Date-time decoding only
    #[default]
    Standard,
    /// Bulk export: also unpack `transactionalData`
    Export,
    /// Users export: export rules plus `dataFields` bucketing
    UserExport,
}

/// Schema-driven record normalizer, one per stream
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    /// Properties declared with `"format": "date-time"`
    datetime_fields: HashSet<String>,
    /// All declared property names (for bucketing)
    declared_fields: HashSet<String>,
    /// Shaping rules for this stream
    shape: RecordShape,
}

/// Field holding nested JSON-encoded data on export records
const TRANSACTIONAL_DATA: &str = "transactionalData";

/// Catch-all property for undeclared user attributes
const DATA_FIELDS: &str = "dataFields";

impl RecordNormalizer {
    /// Build a normalizer from a stream's JSON schema
    pub fn from_schema(schema: &JsonValue, shape: RecordShape) -> Self {
        let properties = schema.get("properties").and_then(JsonValue::as_object);

        let datetime_fields = properties
            .map(|props| {
                props
                    .iter()
                    .filter(|(_, prop)| {
                        prop.get("format").and_then(JsonValue::as_str) == Some("date-time")
                    })
                    .map(|(name, _)| name.clone())
                    .collect()
            })
            .unwrap_or_default();

        let declared_fields = properties
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default();

        Self {
            datetime_fields,
            declared_fields,
            shape,
        }
    }

    /// Normalize one record in place
    pub fn normalize(&self, record: &mut JsonObject) -> Result<()> {
        self.decode_timestamps(record);

        if matches!(self.shape, RecordShape::Export | RecordShape::UserExport) {
            self.unpack_transactional_data(record)?;
        }

        if self.shape == RecordShape::UserExport {
            self.bucket_undeclared_fields(record);
        }

        Ok(())
    }

    /// Decode integer epoch-millisecond values in declared date-time fields
    ///
    /// Non-integer values pass through unchanged, so normalizing an
    /// already-formatted string is a no-op. Zero and null are left alone.
    fn decode_timestamps(&self, record: &mut JsonObject) {
        for name in &self.datetime_fields {
            let Some(value) = record.get(name) else {
                continue;
            };

            let Some(millis) = value.as_i64().filter(|ms| *ms != 0) else {
                continue;
            };

            if let Some(dt) = DateTime::from_timestamp_millis(millis) {
                record.insert(
                    name.clone(),
                    JsonValue::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
                );
            }
        }
    }

    /// Unpack a JSON-encoded `transactionalData` string into its structure
    fn unpack_transactional_data(&self, record: &mut JsonObject) -> Result<()> {
        let Some(JsonValue::String(encoded)) = record.get(TRANSACTIONAL_DATA) else {
            return Ok(());
        };

        let nested: JsonValue = serde_json::from_str(encoded).map_err(|e| {
            Error::decode(format!("Failed to parse {TRANSACTIONAL_DATA} field: {e}"))
        })?;
        record.insert(TRANSACTIONAL_DATA.to_string(), nested);

        Ok(())
    }

    /// Move fields absent from the declared schema under `dataFields`
    fn bucket_undeclared_fields(&self, record: &mut JsonObject) {
        let undeclared: Vec<String> = record
            .keys()
            .filter(|key| !self.declared_fields.contains(*key))
            .cloned()
            .collect();

        if undeclared.is_empty() {
            return;
        }

        let mut bucket = match record.remove(DATA_FIELDS) {
            Some(JsonValue::Object(existing)) => existing,
            _ => JsonObject::new(),
        };

        for key in undeclared {
            if let Some(value) = record.remove(&key) {
                bucket.insert(key, value);
            }
        }

        record.insert(DATA_FIELDS.to_string(), JsonValue::Object(bucket));
    }

    /// Declared date-time properties (for inspection/tests)
    pub fn datetime_fields(&self) -> &HashSet<String> {
        &self.datetime_fields
    }
}
