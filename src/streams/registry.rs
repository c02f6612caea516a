//! The stream registry
//!
//! Every logical data source the tap extracts, declared as static data in
//! dependency order: parents precede their children, and the engine walks
//! this list topologically.

use super::spec::{ChildContextRule, InvocationGuard, ParamStrategy, RecordSource, StreamSpec};
use crate::decode::DecodeMode;
use crate::normalize::RecordShape;
use crate::pagination::PaginationMode;

/// Declare one bulk-export stream
///
/// All export streams share the same endpoint, replication key, and decode
/// mode; only the server-side data type, the keys, and the record shape vary.
const fn export_stream(
    name: &'static str,
    data_type: &'static str,
    primary_keys: &'static [&'static str],
    shape: RecordShape,
) -> StreamSpec {
    StreamSpec {
        name,
        path: "/export/data.json",
        primary_keys,
        replication_key: Some("createdAt"),
        parent: None,
        source: RecordSource::Export,
        decode: DecodeMode::Jsonl,
        pagination: PaginationMode::Disabled,
        params: ParamStrategy::Export { data_type },
        child_context: ChildContextRule::None,
        guard: InvocationGuard::Always,
        context_fields: &[],
        shape,
        selected: true,
    }
}

/// All declared streams, in dependency order
pub static STREAMS: &[StreamSpec] = &[
    StreamSpec {
        name: "lists",
        path: "/lists",
        primary_keys: &["id"],
        replication_key: None,
        parent: None,
        source: RecordSource::Rest,
        decode: DecodeMode::Json {
            records_path: Some("$.lists[*]"),
        },
        pagination: PaginationMode::standard(),
        params: ParamStrategy::Standard,
        child_context: ChildContextRule::FromField {
            key: "listId",
            field: "id",
        },
        guard: InvocationGuard::Always,
        context_fields: &[],
        shape: RecordShape::Standard,
        selected: true,
    },
    StreamSpec {
        name: "list_users",
        path: "/lists/getUsers",
        primary_keys: &["email", "listId"],
        replication_key: None,
        parent: Some("lists"),
        source: RecordSource::Rest,
        // The response body is a plain newline-delimited list of addresses,
        // not JSON, and the endpoint does not paginate.
        decode: DecodeMode::Lines { field: "email" },
        pagination: PaginationMode::Disabled,
        params: ParamStrategy::ContextValue {
            param: "listId",
            key: "listId",
        },
        child_context: ChildContextRule::None,
        guard: InvocationGuard::Always,
        context_fields: &["listId"],
        shape: RecordShape::Standard,
        selected: true,
    },
    StreamSpec {
        name: "campaigns",
        path: "/campaigns",
        primary_keys: &["id"],
        replication_key: Some("updatedAt"),
        parent: None,
        source: RecordSource::Rest,
        decode: DecodeMode::Json {
            records_path: Some("$.campaigns[*]"),
        },
        pagination: PaginationMode::standard(),
        params: ParamStrategy::Standard,
        child_context: ChildContextRule::None,
        guard: InvocationGuard::Always,
        context_fields: &[],
        shape: RecordShape::Standard,
        selected: true,
    },
    StreamSpec {
        name: "channels",
        path: "/channels",
        primary_keys: &["id"],
        replication_key: None,
        parent: None,
        source: RecordSource::Rest,
        decode: DecodeMode::Json {
            records_path: Some("$.channels[*]"),
        },
        pagination: PaginationMode::standard(),
        params: ParamStrategy::Standard,
        child_context: ChildContextRule::None,
        guard: InvocationGuard::Always,
        context_fields: &[],
        shape: RecordShape::Standard,
        selected: true,
    },
    StreamSpec {
        name: "message_types",
        path: "/messageTypes",
        primary_keys: &["id"],
        replication_key: None,
        parent: None,
        source: RecordSource::Rest,
        decode: DecodeMode::Json {
            records_path: Some("$.messageTypes[*]"),
        },
        pagination: PaginationMode::standard(),
        params: ParamStrategy::Standard,
        child_context: ChildContextRule::None,
        guard: InvocationGuard::Always,
        context_fields: &[],
        shape: RecordShape::Standard,
        selected: true,
    },
    // Context generation only: enumerates the message mediums the templates
    // endpoint must be queried by.
    StreamSpec {
        name: "_message_mediums",
        path: "",
        primary_keys: &["messageMedium"],
        replication_key: None,
        parent: None,
        source: RecordSource::Static {
            field: "messageMedium",
            values: &["Email", "Push", "InApp", "SMS"],
        },
        decode: DecodeMode::Json { records_path: None },
        pagination: PaginationMode::Disabled,
        params: ParamStrategy::Standard,
        child_context: ChildContextRule::Record,
        guard: InvocationGuard::Always,
        context_fields: &[],
        shape: RecordShape::Standard,
        selected: false,
    },
    StreamSpec {
        name: "templates",
        path: "/templates",
        primary_keys: &["templateId"],
        replication_key: Some("updatedAt"),
        parent: Some("_message_mediums"),
        source: RecordSource::Rest,
        decode: DecodeMode::Json {
            records_path: Some("$.templates[*]"),
        },
        pagination: PaginationMode::standard(),
        params: ParamStrategy::TemplateWindow,
        child_context: ChildContextRule::FromField {
            key: "templateId",
            field: "templateId",
        },
        guard: InvocationGuard::Always,
        context_fields: &[],
        shape: RecordShape::Standard,
        selected: true,
    },
    StreamSpec {
        name: "email_templates",
        path: "/templates/email/get",
        primary_keys: &["templateId"],
        replication_key: None,
        parent: Some("templates"),
        source: RecordSource::Rest,
        decode: DecodeMode::Json { records_path: None },
        pagination: PaginationMode::standard(),
        params: ParamStrategy::ContextValue {
            param: "templateId",
            key: "templateId",
        },
        child_context: ChildContextRule::None,
        guard: InvocationGuard::ContextEquals {
            key: "messageMedium",
            value: "Email",
        },
        context_fields: &[],
        shape: RecordShape::Standard,
        selected: true,
    },
    StreamSpec {
        name: "metadata",
        path: "/metadata/{table}/{key}",
        primary_keys: &["table", "key"],
        replication_key: None,
        parent: None,
        source: RecordSource::Metadata,
        decode: DecodeMode::Json { records_path: None },
        pagination: PaginationMode::standard(),
        params: ParamStrategy::Standard,
        child_context: ChildContextRule::None,
        guard: InvocationGuard::Always,
        context_fields: &["table", "key"],
        shape: RecordShape::Standard,
        selected: true,
    },
    export_stream(
        "email_bounce",
        "emailBounce",
        &["messageId"],
        RecordShape::Export,
    ),
    export_stream(
        "email_click",
        "emailClick",
        &["messageId"],
        RecordShape::Export,
    ),
    export_stream(
        "email_complaint",
        "emailComplaint",
        &["messageId"],
        RecordShape::Export,
    ),
    export_stream("email_open", "emailOpen", &["messageId"], RecordShape::Export),
    export_stream("email_send", "emailSend", &["messageId"], RecordShape::Export),
    export_stream(
        "email_send_skip",
        "emailSendSkip",
        &["messageId"],
        RecordShape::Export,
    ),
    export_stream(
        "email_subscribe",
        "emailSubscribe",
        &["createdAt", "email"],
        RecordShape::Export,
    ),
    export_stream(
        "email_unsubscribe",
        "emailUnsubscribe",
        &["createdAt", "email"],
        RecordShape::Export,
    ),
    export_stream("sms_bounce", "smsBounce", &["messageId"], RecordShape::Export),
    export_stream("sms_click", "smsClick", &["messageId"], RecordShape::Export),
    export_stream(
        "sms_received",
        "smsReceived",
        &["messageId"],
        RecordShape::Export,
    ),
    export_stream("sms_send", "smsSend", &["messageId"], RecordShape::Export),
    export_stream(
        "sms_send_skip",
        "smsSendSkip",
        &["messageId"],
        RecordShape::Export,
    ),
    export_stream(
        "web_push_click",
        "webPushClick",
        &["messageId"],
        RecordShape::Export,
    ),
    export_stream(
        "web_push_send",
        "webPushSend",
        &["messageId"],
        RecordShape::Export,
    ),
    export_stream(
        "web_push_send_skip",
        "webPushSendSkip",
        &["messageId"],
        RecordShape::Export,
    ),
    export_stream("users", "user", &["userId"], RecordShape::UserExport),
    export_stream(
        "custom_event",
        "customEvent",
        &["createdAt", "email"],
        RecordShape::Export,
    ),
];
