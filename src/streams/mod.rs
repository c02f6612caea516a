//! Stream definitions
//!
//! Static declarations of every logical data source ([`StreamSpec`]), the
//! embedded per-stream schemas, and the per-invocation runtime that binds a
//! spec to its decoder and normalizer.

mod registry;
pub mod schema;
mod spec;

pub use registry::STREAMS;
pub use spec::{ChildContextRule, InvocationGuard, ParamStrategy, RecordSource, StreamSpec};

use crate::decode::RecordDecoder;
use crate::error::{Error, Result};
use crate::normalize::RecordNormalizer;
use crate::types::JsonValue;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Per-stream normalizers, computed once from the embedded schemas
static NORMALIZERS: Lazy<HashMap<&'static str, RecordNormalizer>> = Lazy::new(|| {
    STREAMS
        .iter()
        .map(|spec| {
            let schema = schema::for_stream(spec.name)
                .unwrap_or_else(|e| panic!("stream '{}' has no schema: {e}", spec.name));
            (spec.name, RecordNormalizer::from_schema(schema, spec.shape))
        })
        .collect()
});

/// Find a stream by name
pub fn find(name: &str) -> Result<&'static StreamSpec> {
    STREAMS
        .iter()
        .find(|spec| spec.name == name)
        .ok_or_else(|| Error::StreamNotFound {
            stream: name.to_string(),
        })
}

/// Streams with no parent, in declaration order
pub fn roots() -> impl Iterator<Item = &'static StreamSpec> {
    STREAMS.iter().filter(|spec| spec.parent.is_none())
}

/// Direct children of the named stream, in declaration order
pub fn children_of(name: &str) -> impl Iterator<Item = &'static StreamSpec> + '_ {
    STREAMS.iter().filter(move |spec| spec.parent == Some(name))
}

/// A spec bound to the pieces the fetch loop needs
pub struct StreamRuntime {
    /// The static declaration
    pub spec: &'static StreamSpec,
    /// Declared schema
    pub schema: &'static JsonValue,
    /// Response decoder for the declared mode
    pub decoder: Box<dyn RecordDecoder>,
    /// Schema-driven normalizer, computed once per stream and cached
    pub normalizer: &'static RecordNormalizer,
}

impl StreamRuntime {
    /// Bind a stream spec to its schema, decoder, and normalizer
    pub fn new(spec: &'static StreamSpec) -> Result<Self> {
        let schema = schema::for_stream(spec.name)?;
        let normalizer = NORMALIZERS
            .get(spec.name)
            .ok_or_else(|| Error::StreamNotFound {
                stream: spec.name.to_string(),
            })?;
        Ok(Self {
            spec,
            schema,
            decoder: spec.decode.build(),
            normalizer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use serde_json::json;

    #[test]
    fn test_registry_names_are_unique() {
        let mut names: Vec<&str> = STREAMS.iter().map(|s| s.name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn test_every_parent_exists_and_precedes_its_children() {
        for (idx, spec) in STREAMS.iter().enumerate() {
            if let Some(parent) = spec.parent {
                let parent_idx = STREAMS
                    .iter()
                    .position(|s| s.name == parent)
                    .unwrap_or_else(|| panic!("parent '{parent}' of '{}' not declared", spec.name));
                assert!(parent_idx < idx, "'{parent}' declared after '{}'", spec.name);
            }
        }
    }

    #[test]
    fn test_every_stream_has_a_schema() {
        for spec in STREAMS {
            StreamRuntime::new(spec)
                .unwrap_or_else(|e| panic!("stream '{}' failed to bind: {e}", spec.name));
        }
    }

    #[test]
    fn test_replication_keys_are_declared_datetime_properties() {
        for spec in STREAMS {
            let Some(key) = spec.replication_key else {
                continue;
            };
            let runtime = StreamRuntime::new(spec).unwrap();
            assert!(
                runtime.normalizer.datetime_fields().contains(key),
                "replication key '{key}' of '{}' is not a date-time property",
                spec.name
            );
        }
    }

    #[test]
    fn test_find_and_children() {
        assert_eq!(find("lists").unwrap().name, "lists");
        assert!(find("nonexistent").is_err());

        let children: Vec<&str> = children_of("lists").map(|s| s.name).collect();
        assert_eq!(children, vec!["list_users"]);

        let children: Vec<&str> = children_of("_message_mediums").map(|s| s.name).collect();
        assert_eq!(children, vec!["templates"]);

        let children: Vec<&str> = children_of("templates").map(|s| s.name).collect();
        assert_eq!(children, vec!["email_templates"]);
    }

    #[test]
    fn test_export_streams_share_endpoint_and_disable_pagination() {
        for spec in STREAMS.iter().filter(|s| s.source == RecordSource::Export) {
            assert_eq!(spec.path, "/export/data.json");
            assert_eq!(spec.pagination, crate::pagination::PaginationMode::Disabled);
            assert_eq!(spec.replication_key, Some("createdAt"));
            assert!(matches!(spec.params, ParamStrategy::Export { .. }));
        }
    }

    #[test]
    fn test_child_context_from_field() {
        let rule = ChildContextRule::FromField {
            key: "listId",
            field: "id",
        };
        let record = json!({"id": 7, "name": "x"}).as_object().cloned().unwrap();
        let ctx = rule.derive(&record, &Context::new()).unwrap();
        assert_eq!(ctx.get("listId"), Some(&json!(7)));

        // A record without the source field produces no context.
        let record = json!({"name": "x"}).as_object().cloned().unwrap();
        assert!(rule.derive(&record, &Context::new()).is_none());
    }

    #[test]
    fn test_child_context_record_passthrough_extends_parent() {
        let rule = ChildContextRule::Record;
        let parent = Context::new().with("messageMedium", json!("Email"));
        let record = json!({"templateId": 9}).as_object().cloned().unwrap();

        let ctx = rule.derive(&record, &parent).unwrap();
        assert_eq!(ctx.get_str("messageMedium"), Some("Email"));
        assert_eq!(ctx.get("templateId"), Some(&json!(9)));
    }

    #[test]
    fn test_invocation_guard() {
        let guard = InvocationGuard::ContextEquals {
            key: "messageMedium",
            value: "Email",
        };
        assert!(guard.allows(&Context::new().with("messageMedium", json!("Email"))));
        assert!(!guard.allows(&Context::new().with("messageMedium", json!("Push"))));
        assert!(!guard.allows(&Context::new()));
        assert!(InvocationGuard::Always.allows(&Context::new()));
    }
}
