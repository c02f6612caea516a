//! Pagination types and traits

use serde_json::Value;
use std::collections::HashMap;

/// Result of the next page computation
#[derive(Debug, Clone)]
pub enum NextPage {
    /// More pages available with these query parameters
    Continue {
        /// Query parameters to add/replace on the next request
        query_params: HashMap<String, String>,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Create a continuation with a single parameter
    pub fn with_param(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut params = HashMap::new();
        params.insert(key.into(), value.into());
        Self::Continue {
            query_params: params,
        }
    }

    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }
}

/// Declared pagination behavior for a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationMode {
    /// Token-based pagination: extract the marker at `token_path` from each
    /// response and send it back as `token_param`
    PageToken {
        /// Query parameter carrying the token, e.g. `page`
        token_param: &'static str,
        /// Path to the next-page marker in the response, e.g. `$.next_page`
        token_path: &'static str,
    },
    /// No pagination: every response is the only page
    Disabled,
}

impl PaginationMode {
    /// Token pagination with the API's standard parameter and marker
    pub const fn standard() -> Self {
        Self::PageToken {
            token_param: "page",
            token_path: "$.next_page",
        }
    }

    /// Build the paginator for this mode
    pub fn build(self) -> Box<dyn Paginator> {
        match self {
            PaginationMode::PageToken {
                token_param,
                token_path,
            } => Box::new(super::PageTokenPaginator::new(token_param, token_path)),
            PaginationMode::Disabled => Box::new(super::NoPaginator),
        }
    }
}

/// Tracks pagination state during one fetch loop
///
/// A `None` token means the first request is still pending; once the loop is
/// paging, the token holds the marker extracted from the previous response.
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Current page token
    pub token: Option<String>,
    /// Pages fetched so far
    pub pages_fetched: u32,
    /// Records fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a fresh state (first request pending)
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Record a fetched page
    pub fn add_page(&mut self, records: usize) {
        self.pages_fetched += 1;
        self.total_fetched += records as u64;
    }

    /// Set the token for the next request
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// Query parameters for the next request given the current state
    fn params(&self, state: &PaginationState) -> HashMap<String, String>;

    /// Process a response body and decide whether another page must be fetched
    ///
    /// `records_count` is informational only: an empty page never terminates
    /// pagination by itself, only the absence of the next-page marker does.
    fn process_response(
        &self,
        body: &Value,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage;
}
