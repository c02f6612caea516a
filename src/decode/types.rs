//! Decoder types and traits

use crate::error::Result;
use serde_json::Value;

/// Declared response shape for a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// JSON document; records selected by an optional path expression.
    /// With no path the whole document is a single record.
    Json {
        /// JSONPath to the record elements, e.g. `$.lists[*]`
        records_path: Option<&'static str>,
    },
    /// Newline-delimited JSON, one object per non-empty line
    Jsonl,
    /// Plain text, one record per line wrapped as `{"<field>": line}`
    Lines {
        /// Field name the line is stored under
        field: &'static str,
    },
}

impl DecodeMode {
    /// Build the decoder for this mode
    pub fn build(self) -> Box<dyn RecordDecoder> {
        match self {
            DecodeMode::Json { records_path } => Box::new(match records_path {
                Some(path) => super::JsonDecoder::with_path(path),
                None => super::JsonDecoder::new(),
            }),
            DecodeMode::Jsonl => Box::new(super::JsonlDecoder::new()),
            DecodeMode::Lines { field } => Box::new(super::LineDecoder::new(field)),
        }
    }
}

/// Trait for decoding response bodies into records
pub trait RecordDecoder: Send + Sync {
    /// Decode the response body into a list of records
    ///
    /// A malformed body is a fatal decode error for the stream; the caller
    /// must not continue to further pages.
    fn decode(&self, body: &str) -> Result<Vec<Value>>;
}
