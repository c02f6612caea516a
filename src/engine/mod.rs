//! Extraction engine
//!
//! Walks the stream registry in dependency order and runs one paginated
//! fetch loop per stream invocation. Context flows down the hierarchy as an
//! explicit argument: a parent derives one context per record, and each
//! context parameterizes exactly one child invocation. A parent with zero
//! records fans out to zero child fetches.
//!
//! Stream isolation: a fatal decode or HTTP error aborts the failing
//! top-level stream and its descendants; sibling streams still run unless
//! `fail_fast` is set.

mod types;

pub use types::{SyncConfig, SyncStats};

use crate::config::{format_api_datetime, parse_datetime, TapConfig};
use crate::context::{value_to_param, Context};
use crate::decode::decode_ndjson_line;
use crate::error::{Error, Result};
use crate::export;
use crate::http::{HttpClient, RequestConfig};
use crate::output::RecordSink;
use crate::pagination::{PaginationMode, PaginationState};
use crate::state::StateManager;
use crate::streams::{self, ParamStrategy, RecordSource, StreamRuntime, StreamSpec};
use crate::template;
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio::io::AsyncBufReadExt;
use tracing::{debug, info, warn};

/// Extraction engine for one tap run
pub struct SyncEngine<S: RecordSink + Send> {
    /// HTTP client, already configured with base URL and API key
    client: HttpClient,
    /// Replication state manager
    state: StateManager,
    /// Tap configuration
    config: TapConfig,
    /// Run configuration
    sync_config: SyncConfig,
    /// Output boundary
    sink: S,
    /// Statistics
    stats: SyncStats,
    /// Streams whose schema has been announced this run
    announced: HashSet<&'static str>,
}

impl<S: RecordSink + Send + Sync> SyncEngine<S> {
    /// Create a new engine
    pub fn new(client: HttpClient, state: StateManager, config: TapConfig, sink: S) -> Self {
        Self {
            client,
            state,
            config,
            sync_config: SyncConfig::default(),
            sink,
            stats: SyncStats::default(),
            announced: HashSet::new(),
        }
    }

    /// Set run configuration
    #[must_use]
    pub fn with_sync_config(mut self, sync_config: SyncConfig) -> Self {
        self.sync_config = sync_config;
        self
    }

    /// Current statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// The state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Consume the engine, returning the sink and final statistics
    pub fn into_parts(self) -> (S, SyncStats) {
        (self.sink, self.stats)
    }

    /// Run all streams, or only the named ones (plus the parents they need)
    pub async fn run(&mut self, selection: Option<&[String]>) -> Result<()> {
        if let Some(names) = selection {
            for name in names {
                streams::find(name)?;
            }
        }

        let start = Instant::now();

        for spec in streams::roots() {
            if !is_needed(spec, selection) {
                continue;
            }

            info!("Starting stream: {}", spec.name);
            match self.run_stream(spec, Context::new(), selection).await {
                Ok(()) => {
                    self.stats.add_stream();
                    info!("Completed stream: {}", spec.name);
                }
                Err(e) => {
                    self.stats.add_error();
                    warn!("Stream '{}' failed: {e}", spec.name);
                    if self.sync_config.fail_fast {
                        return Err(e);
                    }
                }
            }

            let state_value = self.state.to_value().await?;
            self.sink.state(&state_value)?;
        }

        self.stats.set_duration(start.elapsed().as_millis() as u64);
        Ok(())
    }

    /// Run one stream invocation and fan out to its children
    fn run_stream<'s>(
        &'s mut self,
        spec: &'static StreamSpec,
        context: Context,
        selection: Option<&'s [String]>,
    ) -> BoxFuture<'s, Result<()>> {
        Box::pin(async move {
            if !spec.guard.allows(&context) {
                debug!("Skipping '{}' for context {:?}", spec.name, context);
                return Ok(());
            }

            let runtime = StreamRuntime::new(spec)?;
            let emit = is_selected(spec, selection);

            if emit && self.announced.insert(spec.name) {
                self.sink.schema(
                    spec.name,
                    runtime.schema,
                    spec.primary_keys,
                    spec.replication_key,
                )?;
            }

            let records = match spec.source {
                RecordSource::Static { field, values } => static_records(field, values),
                RecordSource::Rest => self.fetch_paginated(&runtime, &context, emit).await?,
                RecordSource::Metadata => self.fetch_metadata(&runtime, &context, emit).await?,
                RecordSource::Export => {
                    self.fetch_export(&runtime, &context, emit).await?;
                    Vec::new()
                }
            };

            for child in streams::children_of(spec.name) {
                if !is_needed(child, selection) {
                    continue;
                }
                for record in &records {
                    if let Some(child_ctx) = spec.child_context.derive(record, &context) {
                        self.run_stream(child, child_ctx, selection).await?;
                    }
                }
            }

            Ok(())
        })
    }

    /// Standard paginated fetch loop
    async fn fetch_paginated(
        &mut self,
        runtime: &StreamRuntime,
        context: &Context,
        emit: bool,
    ) -> Result<Vec<JsonObject>> {
        let spec = runtime.spec;
        let path = template::render_path(spec.path, context)?;
        let paginator = spec.pagination.build();
        let mut pagination_state = PaginationState::new();
        let mut out = Vec::new();

        loop {
            let mut request = RequestConfig::new();
            for (key, value) in self.base_params(spec, context).await? {
                request = request.query(key, value);
            }
            for (key, value) in paginator.params(&pagination_state) {
                request = request.query(key, value);
            }

            let response = self.client.get_with_config(&path, request).await?;
            let body = response.text().await.map_err(Error::Http)?;

            let records = runtime.decoder.decode(&body)?;
            let record_count = records.len();
            self.stats.add_page();
            debug!(
                "Stream '{}' page {}: {record_count} records",
                spec.name,
                pagination_state.pages_fetched + 1
            );

            for raw in records {
                let record = finalize(runtime, context, raw)?;
                if emit {
                    self.emit(spec, &record).await?;
                }
                out.push(record);
            }

            let next = match spec.pagination {
                PaginationMode::Disabled => {
                    paginator.process_response(&JsonValue::Null, record_count, &mut pagination_state)
                }
                PaginationMode::PageToken { .. } => {
                    let document: JsonValue = serde_json::from_str(&body)
                        .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))?;
                    paginator.process_response(&document, record_count, &mut pagination_state)
                }
            };

            if next.is_done() {
                break;
            }
        }

        Ok(out)
    }

    /// Metadata catalog traversal: list tables, list keys per table, fetch
    /// one record per (table, key) pair
    async fn fetch_metadata(
        &mut self,
        runtime: &StreamRuntime,
        context: &Context,
        emit: bool,
    ) -> Result<Vec<JsonObject>> {
        let spec = runtime.spec;
        let mut out = Vec::new();

        let tables = self.fetch_document("/metadata").await?;
        for table in results_of(&tables, "/metadata")? {
            let name = table
                .get("name")
                .and_then(JsonValue::as_str)
                .ok_or_else(|| Error::decode("Metadata table entry has no 'name'"))?;

            let table_endpoint = format!("/metadata/{name}");
            let keys = self.fetch_document(&table_endpoint).await?;
            for entry in results_of(&keys, &table_endpoint)? {
                let table_name = entry
                    .get("table")
                    .and_then(JsonValue::as_str)
                    .ok_or_else(|| Error::decode("Metadata key entry has no 'table'"))?;
                let key = entry
                    .get("key")
                    .and_then(JsonValue::as_str)
                    .ok_or_else(|| Error::decode("Metadata key entry has no 'key'"))?;

                let leaf_context = context
                    .child()
                    .with("table", JsonValue::String(table_name.to_string()))
                    .with("key", JsonValue::String(key.to_string()));

                let records = self.fetch_paginated(runtime, &leaf_context, emit).await?;
                out.extend(records);
            }
        }

        debug!("Stream '{}': {} metadata entries", spec.name, out.len());
        Ok(out)
    }

    /// Bulk export: stage the unbounded response body to disk, then decode
    /// the staging file line by line
    ///
    /// The staging file and its directory are removed when `buffer` drops,
    /// on success and on every failure path alike.
    async fn fetch_export(
        &mut self,
        runtime: &StreamRuntime,
        context: &Context,
        emit: bool,
    ) -> Result<()> {
        let spec = runtime.spec;

        // Export bodies can take far longer than a normal page to stream in.
        let mut request = RequestConfig::new().timeout(Duration::from_secs(3600));
        for (key, value) in self.base_params(spec, context).await? {
            request = request.query(key, value);
        }

        let buffer = export::download(
            &self.client,
            spec.path,
            request,
            self.sync_config.staging_dir.as_deref(),
        )
        .await?;

        let mut lines = buffer.reader().await?.lines();
        let mut line_num = 0usize;
        while let Some(line) = lines.next_line().await? {
            line_num += 1;
            if line.trim().is_empty() {
                continue;
            }

            let raw = decode_ndjson_line(&line, line_num)?;
            let record = finalize(runtime, context, raw)?;
            if emit {
                self.emit(spec, &record).await?;
            }
        }

        self.stats.add_page();
        debug!("Stream '{}': {line_num} export lines", spec.name);
        Ok(())
    }

    /// Fetch one JSON document (used by the metadata enumeration calls)
    async fn fetch_document(&self, path: &str) -> Result<JsonValue> {
        let response = self.client.get(path).await?;
        let body = response.text().await.map_err(Error::Http)?;
        serde_json::from_str(&body).map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))
    }

    /// Emit one record and advance the stream bookmark
    async fn emit(&mut self, spec: &StreamSpec, record: &JsonObject) -> Result<()> {
        self.sink.record(spec.name, record)?;
        self.stats.add_record();

        if let Some(key) = spec.replication_key {
            if let Some(value) = record.get(key).filter(|v| !v.is_null()) {
                self.state
                    .advance_bookmark(spec.name, &value_to_param(value))
                    .await?;
            }
        }

        Ok(())
    }

    /// Query parameters common to every page of a stream invocation
    async fn base_params(
        &self,
        spec: &StreamSpec,
        context: &Context,
    ) -> Result<Vec<(String, String)>> {
        let mut params = Vec::new();

        // Incremental streams ask the server for replication-key order so
        // bookmarking stays monotonic.
        if let Some(key) = spec.replication_key {
            params.push(("sort".to_string(), "asc".to_string()));
            params.push(("order_by".to_string(), key.to_string()));
        }

        match spec.params {
            ParamStrategy::Standard => {}
            ParamStrategy::ContextValue { param, key } => {
                params.push((param.to_string(), context.param(spec.name, key)?));
            }
            ParamStrategy::TemplateWindow => {
                params.push((
                    "messageMedium".to_string(),
                    context.param(spec.name, "messageMedium")?,
                ));
                if let Some(start) = self.starting_timestamp(spec).await? {
                    params.push(("startDateTime".to_string(), format_api_datetime(start)));
                }
            }
            ParamStrategy::Export { data_type } => {
                params.push(("dataTypeName".to_string(), data_type.to_string()));
                match self.starting_timestamp(spec).await? {
                    Some(start) => {
                        params.push(("startDateTime".to_string(), format_api_datetime(start)));
                    }
                    None => params.push(("range".to_string(), "All".to_string())),
                }
                if let Some(end) = self.config.end_datetime()? {
                    params.push(("endDateTime".to_string(), format_api_datetime(end)));
                }
            }
        }

        Ok(params)
    }

    /// Starting timestamp for an incremental stream: the persisted bookmark
    /// if it is past the configured start date, else the start date
    async fn starting_timestamp(&self, spec: &StreamSpec) -> Result<Option<DateTime<Utc>>> {
        let bookmark = match self.state.get_bookmark(spec.name).await {
            Some(value) => Some(parse_datetime(&value)?),
            None => None,
        };
        let configured = self.config.start_datetime()?;

        Ok(match (bookmark, configured) {
            (Some(b), Some(c)) => Some(b.max(c)),
            (Some(b), None) => Some(b),
            (None, Some(c)) => Some(c),
            (None, None) => None,
        })
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Whether a stream's records are emitted under the given selection
fn is_selected(spec: &StreamSpec, selection: Option<&[String]>) -> bool {
    spec.selected && selection.map_or(true, |names| names.iter().any(|n| n == spec.name))
}

/// Whether a stream must run at all: it is selected itself, or a descendant
/// needs its context
fn is_needed(spec: &'static StreamSpec, selection: Option<&[String]>) -> bool {
    is_selected(spec, selection)
        || streams::children_of(spec.name).any(|child| is_needed(child, selection))
}

/// Records for a static discovery stream
fn static_records(field: &str, values: &[&str]) -> Vec<JsonObject> {
    values
        .iter()
        .map(|value| {
            let mut record = JsonObject::new();
            record.insert(field.to_string(), JsonValue::String((*value).to_string()));
            record
        })
        .collect()
}

/// Normalize a raw record and enforce the key invariants
fn finalize(runtime: &StreamRuntime, context: &Context, raw: JsonValue) -> Result<JsonObject> {
    let spec = runtime.spec;

    let JsonValue::Object(mut record) = raw else {
        return Err(Error::decode(format!(
            "Stream '{}' expected object records",
            spec.name
        )));
    };

    runtime.normalizer.normalize(&mut record)?;

    for key in spec.context_fields {
        let value = context.require(spec.name, key)?.clone();
        record.entry((*key).to_string()).or_insert(value);
    }

    let mut required = spec.primary_keys.to_vec();
    if let Some(key) = spec.replication_key {
        required.push(key);
    }
    for field in required {
        match record.get(field) {
            None | Some(JsonValue::Null) => {
                return Err(Error::MissingKeyProperty {
                    stream: spec.name.to_string(),
                    field: field.to_string(),
                })
            }
            Some(_) => {}
        }
    }

    Ok(record)
}

/// The `results` array of a metadata enumeration response
fn results_of(document: &JsonValue, endpoint: &str) -> Result<Vec<JsonValue>> {
    document
        .get("results")
        .and_then(JsonValue::as_array)
        .cloned()
        .ok_or_else(|| Error::decode(format!("Response from {endpoint} has no 'results' array")))
}
