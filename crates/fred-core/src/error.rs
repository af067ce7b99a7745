//! Error types for data operations.
//!
//! This module defines [`FredError`] which covers all error cases that can
//! occur when fetching, storing, or analyzing FRED data.

use thiserror::Error;

use crate::types::CategoryId;

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum FredError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// The upstream service answered with a non-success HTTP status.
    #[error("Request failed with HTTP status {status}")]
    BadRequest {
        /// The HTTP status code returned by the service.
        status: u16,
    },

    /// Rate limit exceeded upstream.
    #[error("Rate limited: retry after {retry_after:?}")]
    RateLimited {
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The requested category was not found, locally or remotely.
    #[error("Category with id {0} not found")]
    CategoryNotFound(CategoryId),

    /// The requested series was not found, locally or remotely.
    #[error("Series not found: {0}")]
    SeriesNotFound(String),

    /// Error parsing a payload from the service or the store.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A read query against the local store failed.
    #[error("Store query failed: {0}")]
    Query(String),

    /// A write against the local store failed.
    #[error("Store write failed: {0}")]
    Write(String),

    /// The requested operation is not supported by this component.
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// The requested combination of inputs cannot be computed.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The series cannot be rendered as a graph.
    #[error("Series is not plottable: {0}")]
    NotPlottable(String),
}

/// Result type alias using [`FredError`].
pub type Result<T> = std::result::Result<T, FredError>;
