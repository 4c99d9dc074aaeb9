//! Error types for the query client.

use thiserror::Error;

/// Failure modes of a single query call.
///
/// Every variant is terminal for the call in progress; the client never
/// retries and callers needing resilience must wrap the call.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Input rejected before any request was issued.
    #[error("invalid query input: {0}")]
    Validation(String),

    /// Server replied with a non-success status.
    #[error("query failed with status {status}: {body}")]
    Request { status: u16, body: String },

    /// Server replied 2xx but not with an Arrow stream.
    #[error("expected Arrow stream content type but got: {0}")]
    Protocol(String),

    /// Transport-level failure from the underlying HTTP client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body could not be decoded into a row set.
    #[error("failed to decode query response: {0}")]
    Decode(String),
}
