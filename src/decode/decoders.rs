//! Decoder implementations
//!
//! Each decoder handles one response shape. All JSON parsing goes through
//! serde_json with the `arbitrary_precision` feature enabled, so numeric
//! values keep their exact decimal representation end to end.

use super::types::RecordDecoder;
use crate::error::{Error, Result};
use serde_json::{Map, Value};

// ============================================================================
// JSON Decoder
// ============================================================================

/// JSON decoder with optional record path extraction
#[derive(Debug, Clone, Default)]
pub struct JsonDecoder {
    /// JSONPath to extract records
    records_path: Option<String>,
}

impl JsonDecoder {
    /// Create a decoder that treats the whole document as the records
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with a records path
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            records_path: Some(path.into()),
        }
    }

    /// Extract records from a parsed document
    fn extract_records(&self, value: &Value) -> Result<Vec<Value>> {
        match &self.records_path {
            Some(path) => {
                // Wildcard selections like `$.lists[*]` go through
                // jsonpath-rust; plain dotted paths take the cheap route.
                if path.contains('*') {
                    extract_with_jsonpath(value, path)
                } else {
                    match extract_simple_path(value, path) {
                        Some(Value::Array(arr)) => Ok(arr),
                        Some(v) => Ok(vec![v]),
                        None => Ok(vec![]),
                    }
                }
            }
            None => match value {
                Value::Array(arr) => Ok(arr.clone()),
                _ => Ok(vec![value.clone()]),
            },
        }
    }
}

impl RecordDecoder for JsonDecoder {
    fn decode(&self, body: &str) -> Result<Vec<Value>> {
        let value: Value = serde_json::from_str(body).map_err(|e| Error::Decode {
            message: format!("Failed to parse JSON: {e}"),
        })?;
        self.extract_records(&value)
    }
}

// ============================================================================
// JSONL Decoder
// ============================================================================

/// JSON Lines decoder (one JSON object per line)
#[derive(Debug, Clone, Default)]
pub struct JsonlDecoder;

impl JsonlDecoder {
    /// Create a new JSONL decoder
    pub fn new() -> Self {
        Self
    }
}

impl RecordDecoder for JsonlDecoder {
    fn decode(&self, body: &str) -> Result<Vec<Value>> {
        let mut records = Vec::new();

        for (line_num, line) in body.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            records.push(decode_ndjson_line(line, line_num + 1)?);
        }

        Ok(records)
    }
}

/// Decode a single newline-delimited JSON line
///
/// Shared between the in-memory decoder and the bulk export path, which reads
/// its staging file one line at a time.
pub fn decode_ndjson_line(line: &str, line_num: usize) -> Result<Value> {
    serde_json::from_str(line.trim()).map_err(|e| Error::Decode {
        message: format!("Failed to parse JSONL at line {line_num}: {e}"),
    })
}

// ============================================================================
// Line Decoder
// ============================================================================

/// Plain-text decoder wrapping each line as a single-field record
///
/// Used for `/lists/getUsers`, whose body is a newline-delimited list of
/// email addresses rather than JSON.
#[derive(Debug, Clone)]
pub struct LineDecoder {
    /// Field name the line is stored under
    field: String,
}

impl LineDecoder {
    /// Create a line decoder storing lines under the given field
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl RecordDecoder for LineDecoder {
    fn decode(&self, body: &str) -> Result<Vec<Value>> {
        Ok(body
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let mut obj = Map::new();
                obj.insert(self.field.clone(), Value::String(line.to_string()));
                Value::Object(obj)
            })
            .collect())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Extract a value using simple dot-notation path
fn extract_simple_path(value: &Value, path: &str) -> Option<Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    Some(current.clone())
}

/// Extract records using jsonpath-rust
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path).map_err(|e| Error::JsonPath {
        message: format!("Invalid JSONPath: {e}"),
    })?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}
