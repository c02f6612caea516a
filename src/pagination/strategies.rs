//! Pagination strategy implementations

use super::types::{NextPage, PaginationState, Paginator};
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// Page Token Pagination
// ============================================================================

/// Token-based pagination driven by a marker in the response body
///
/// After each response the marker at `token_path` is extracted; if present it
/// becomes the `token_param` query parameter of the next request, otherwise
/// the loop terminates. Zero decoded records on a page is not a termination
/// signal: filtered queries can legitimately produce an empty page that still
/// carries a continuation marker.
#[derive(Debug, Clone)]
pub struct PageTokenPaginator {
    /// Query parameter name for the token
    pub token_param: String,
    /// Path to the next-page marker in the response
    pub token_path: String,
}

impl PageTokenPaginator {
    /// Create a new page token paginator
    pub fn new(token_param: impl Into<String>, token_path: impl Into<String>) -> Self {
        Self {
            token_param: token_param.into(),
            token_path: token_path.into(),
        }
    }
}

impl Paginator for PageTokenPaginator {
    fn params(&self, state: &PaginationState) -> HashMap<String, String> {
        let mut params = HashMap::new();
        if let Some(token) = &state.token {
            params.insert(self.token_param.clone(), token.clone());
        }
        params
    }

    fn process_response(
        &self,
        body: &Value,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_page(records_count);

        match extract_token(body, &self.token_path) {
            Some(token) if !token.is_empty() => {
                state.set_token(token.clone());
                NextPage::with_param(&self.token_param, token)
            }
            _ => {
                state.mark_done();
                NextPage::Done
            }
        }
    }
}

/// Extract the next-page marker as a string, if present and non-null
fn extract_token(body: &Value, path: &str) -> Option<String> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = body;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    match current {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================================
// No Pagination
// ============================================================================

/// No pagination: a single request per invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn params(&self, _state: &PaginationState) -> HashMap<String, String> {
        HashMap::new()
    }

    fn process_response(
        &self,
        _body: &Value,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_page(records_count);
        state.mark_done();
        NextPage::Done
    }
}
