//! Error types for catalog access.

use thiserror::Error;

/// Errors that can occur when fetching from a catalog.
///
/// Every variant surfaces to the UI as "unavailable"; none of them is fatal.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The HTTP request failed (connect, timeout, TLS, body decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The catalog answered with a non-2xx status.
    #[error("catalog returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// No API key was configured.
    #[error("no API key configured (set api.key or REELWATCH_API__KEY)")]
    MissingApiKey,

    /// The catalog has no response for this query.
    #[error("no response for {0}")]
    Missing(String),

    /// The response payload did not match the query kind.
    #[error("unexpected payload for {0}")]
    UnexpectedPayload(String),
}
