//! Response decoders
//!
//! Turns one completed HTTP response body into a finite sequence of raw
//! record objects. The Iterable API answers in three shapes: a JSON document
//! with a records path (`$.lists[*]`), newline-delimited JSON (the bulk
//! export endpoint), and a plain line-delimited text body (`/lists/getUsers`).

mod decoders;
mod types;

pub use decoders::{decode_ndjson_line, JsonDecoder, JsonlDecoder, LineDecoder};
pub use types::{DecodeMode, RecordDecoder};
