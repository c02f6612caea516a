//! HTTP client with retry and rate limiting
//!
//! The only transport surface the tap needs: authenticated GET requests with
//! retry/backoff and request pacing. Authentication is a single `Api-Key`
//! header applied to every request.

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
