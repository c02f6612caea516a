//! Static stream schemas
//!
//! One JSON schema per emitted stream, embedded at compile time from
//! `schemas/`. Parsed once and cached; the normalizer and the discovery
//! output both read from here.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use once_cell::sync::Lazy;
use serde_json::json;
use std::collections::HashMap;

macro_rules! embedded_schema {
    ($name:literal) => {
        ($name, include_str!(concat!("schemas/", $name, ".json")))
    };
}

/// Raw embedded schema sources
const SCHEMA_SOURCES: &[(&str, &str)] = &[
    embedded_schema!("lists"),
    embedded_schema!("list_users"),
    embedded_schema!("campaigns"),
    embedded_schema!("channels"),
    embedded_schema!("message_types"),
    embedded_schema!("templates"),
    embedded_schema!("email_templates"),
    embedded_schema!("metadata"),
    embedded_schema!("email_bounce"),
    embedded_schema!("email_click"),
    embedded_schema!("email_complaint"),
    embedded_schema!("email_open"),
    embedded_schema!("email_send"),
    embedded_schema!("email_send_skip"),
    embedded_schema!("email_subscribe"),
    embedded_schema!("email_unsubscribe"),
    embedded_schema!("sms_bounce"),
    embedded_schema!("sms_click"),
    embedded_schema!("sms_received"),
    embedded_schema!("sms_send"),
    embedded_schema!("sms_send_skip"),
    embedded_schema!("web_push_click"),
    embedded_schema!("web_push_send"),
    embedded_schema!("web_push_send_skip"),
    embedded_schema!("users"),
    embedded_schema!("custom_event"),
];

/// Parsed schemas keyed by stream name
static SCHEMAS: Lazy<HashMap<&'static str, JsonValue>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, JsonValue> = SCHEMA_SOURCES
        .iter()
        .map(|&(name, source)| {
            let schema = serde_json::from_str(source)
                .unwrap_or_else(|e| panic!("embedded schema '{name}' is invalid: {e}"));
            (name, schema)
        })
        .collect();

    // Internal discovery stream, context generation only.
    map.insert(
        "_message_mediums",
        json!({
            "type": "object",
            "properties": {
                "messageMedium": {"type": "string"}
            }
        }),
    );

    map
});

/// Look up the declared schema for a stream
pub fn for_stream(name: &str) -> Result<&'static JsonValue> {
    SCHEMAS.get(name).ok_or_else(|| Error::SchemaNotFound {
        stream: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JsonValue;

    #[test]
    fn test_all_embedded_schemas_parse() {
        for &(name, _) in SCHEMA_SOURCES {
            let schema = for_stream(name).unwrap();
            assert!(
                schema.get("properties").is_some(),
                "schema '{name}' has no properties"
            );
        }
    }

    #[test]
    fn test_unknown_stream_fails() {
        assert!(for_stream("nope").is_err());
    }

    #[test]
    fn test_export_schemas_declare_created_at_datetime() {
        for name in ["email_bounce", "sms_send", "web_push_click", "custom_event"] {
            let schema = for_stream(name).unwrap();
            let format = schema["properties"]["createdAt"]["format"].clone();
            assert_eq!(format, JsonValue::String("date-time".to_string()), "{name}");
        }
    }

    #[test]
    fn test_users_schema_declares_data_fields() {
        let schema = for_stream("users").unwrap();
        assert!(schema["properties"]["dataFields"].is_object());
    }
}
