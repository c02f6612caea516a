//! Error types for tap-iterable
//!
//! This module defines the error hierarchy for the entire tap.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for tap-iterable
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong with the configuration
        message: String,
    },

    /// A required config field is absent
    #[error("Missing required config field: {field}")]
    MissingConfigField {
        /// The missing field name
        field: String,
    },

    /// JSON (de)serialization failure
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    /// Transport-level request failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// 429 with retries exhausted
    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited {
        /// Server-requested wait
        retry_after_seconds: u64,
    },

    /// Request timed out with retries exhausted
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout
        timeout_ms: u64,
    },

    /// Retry budget exhausted without a terminal response
    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded {
        /// Configured retry budget
        max_retries: u32,
    },

    /// Malformed URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    /// Invalid records path expression
    #[error("JSONPath error: {message}")]
    JsonPath {
        /// What failed
        message: String,
    },

    /// Malformed response body; fatal for the stream
    #[error("Failed to decode response: {message}")]
    Decode {
        /// What failed, with position where known
        message: String,
    },

    /// A dependent stream was invoked without a context key it requires
    #[error("Stream '{stream}' requires context key '{key}' but none was provided")]
    MissingContextKey {
        /// Stream that was invoked
        stream: String,
        /// The absent key
        key: String,
    },

    /// A record violates its stream's key invariant
    #[error("Record in stream '{stream}' is missing key property '{field}'")]
    MissingKeyProperty {
        /// Stream the record belongs to
        stream: String,
        /// The absent or null key field
        field: String,
    },

    // ============================================================================
    // Stream / Catalog Errors
    // ============================================================================
    /// Named stream is not declared
    #[error("Stream '{stream}' not found in catalog")]
    StreamNotFound {
        /// The unknown name
        stream: String,
    },

    /// A declared stream has no embedded schema
    #[error("No schema declared for stream '{stream}'")]
    SchemaNotFound {
        /// Stream missing its schema
        stream: String,
    },

    // ============================================================================
    // Template Errors
    // ============================================================================
    /// A path placeholder had no matching context key
    #[error("Undefined variable in path template: {variable}")]
    UndefinedVariable {
        /// The unresolved placeholder name(s)
        variable: String,
    },

    // ============================================================================
    // State Errors
    // ============================================================================
    /// State persistence failure
    #[error("State error: {message}")]
    State {
        /// What failed
        message: String,
    },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    /// Filesystem failure (export staging, config/state files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    /// Free-form error
    #[error("{0}")]
    Other(String),

    /// Wrapped error from a collaborator
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a JSONPath error
    pub fn json_path(message: impl Into<String>) -> Self {
        Self::JsonPath {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a missing context key error
    pub fn missing_context_key(stream: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingContextKey {
            stream: stream.into(),
            key: key.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for tap-iterable
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
