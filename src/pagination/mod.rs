//! Pagination strategies
//!
//! The Iterable API paginates with an opaque `next_page` marker in the
//! response body, carried into the next request as `page=<token>`. Streams
//! that return their full result set in one response disable pagination
//! entirely.

mod strategies;
mod types;

pub use strategies::{NoPaginator, PageTokenPaginator};
pub use types::{NextPage, PaginationMode, PaginationState, Paginator};
