//! Stream declarations
//!
//! A [`StreamSpec`] is the immutable description of one logical data source:
//! endpoint path, keys, pagination and decode modes, parent dependency, and
//! the small strategy values that parameterize the generic fetch engine.
//! Specs are plain static data; all behavior lives in the engine.

use crate::context::Context;
use crate::decode::DecodeMode;
use crate::normalize::RecordShape;
use crate::pagination::PaginationMode;
use crate::types::JsonObject;

/// Where a stream's records come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    /// Standard REST endpoint fetched through the paginated loop
    Rest,
    /// Fixed in-process values, one record per entry wrapped under `field`
    ///
    /// Used by discovery streams that only exist to enumerate a key space.
    Static {
        /// Field name each value is wrapped under
        field: &'static str,
        /// The enumerated values
        values: &'static [&'static str],
    },
    /// Metadata catalog: three chained calls per logical entity
    /// (`/metadata` -> `/metadata/{name}` -> `/metadata/{table}/{key}`)
    Metadata,
    /// Bulk export endpoint streamed through disk-backed staging
    Export,
}

/// How a stream builds its query parameters beyond pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStrategy {
    /// Replication sort parameters and the page token only
    Standard,
    /// [`ParamStrategy::Standard`] plus one parameter copied from the
    /// invocation context
    ContextValue {
        /// Query parameter name
        param: &'static str,
        /// Context key supplying the value
        key: &'static str,
    },
    /// Templates listing: `messageMedium` from context plus the incremental
    /// window start as `startDateTime`
    TemplateWindow,
    /// Bulk export query: `dataTypeName` plus `startDateTime`/`endDateTime`
    /// or `range=All` when no window start exists
    Export {
        /// Server-side data type selector
        data_type: &'static str,
    },
}

/// How a parent stream derives the context for its children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildContextRule {
    /// Stream has no children
    None,
    /// Extend the parent context with `key` taken from `field` of the record
    FromField {
        /// Context key to add
        key: &'static str,
        /// Record field supplying the value
        field: &'static str,
    },
    /// Extend the parent context with every field of the record
    Record,
}

impl ChildContextRule {
    /// Derive the child context for one parent record
    ///
    /// Returns `None` when the record cannot produce a context (the source
    /// field is absent), in which case the child invocation is skipped.
    pub fn derive(&self, record: &JsonObject, parent: &Context) -> Option<Context> {
        match self {
            ChildContextRule::None => None,
            ChildContextRule::FromField { key, field } => {
                let value = record.get(*field)?.clone();
                Some(parent.child().with(*key, value))
            }
            ChildContextRule::Record => {
                let mut ctx = parent.child();
                for (key, value) in record {
                    ctx.insert(key.clone(), value.clone());
                }
                Some(ctx)
            }
        }
    }
}

/// Condition under which a stream invocation runs at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationGuard {
    /// Always run
    Always,
    /// Run only when the context carries `key` equal to `value`
    ///
    /// The email-templates detail endpoint only exists for the Email medium.
    ContextEquals {
        /// Context key to check
        key: &'static str,
        /// Required value
        value: &'static str,
    },
}

impl InvocationGuard {
    /// Whether this invocation should run for the given context
    pub fn allows(&self, ctx: &Context) -> bool {
        match self {
            InvocationGuard::Always => true,
            InvocationGuard::ContextEquals { key, value } => ctx.get_str(key) == Some(value),
        }
    }
}

/// Immutable declaration of one logical data source
#[derive(Debug, Clone, Copy)]
pub struct StreamSpec {
    /// Stream name as emitted to the output boundary
    pub name: &'static str,
    /// Endpoint path, possibly templated with context keys (`{table}`)
    pub path: &'static str,
    /// Primary key fields, non-null on every emitted record
    pub primary_keys: &'static [&'static str],
    /// Replication key for incremental extraction, if any
    pub replication_key: Option<&'static str>,
    /// Parent stream supplying this stream's context, if any
    pub parent: Option<&'static str>,
    /// Record source kind
    pub source: RecordSource,
    /// Response decoding mode
    pub decode: DecodeMode,
    /// Pagination mode
    pub pagination: PaginationMode,
    /// Query parameter strategy
    pub params: ParamStrategy,
    /// Child context derivation rule
    pub child_context: ChildContextRule,
    /// Invocation guard evaluated against the received context
    pub guard: InvocationGuard,
    /// Context keys merged into every emitted record
    pub context_fields: &'static [&'static str],
    /// Normalization shape
    pub shape: RecordShape,
    /// Whether records are emitted (internal discovery streams are not)
    pub selected: bool,
}

impl StreamSpec {
    /// Whether this stream replicates incrementally
    pub fn is_incremental(&self) -> bool {
        self.replication_key.is_some()
    }
}
