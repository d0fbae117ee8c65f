//! Error types for user list synchronization.

use http::StatusCode;

/// Errors that can occur while fetching the user list from the panel.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request failed in transport (connect, timeout, body read).
    #[error("Failed to fetch user list: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The panel answered with a non-success status.
    #[error("Panel responded with status {0}")]
    Status(StatusCode),

    /// The response body exceeded the configured size cap.
    #[error("User list response exceeds {limit} bytes")]
    ResponseTooLarge {
        /// The configured cap in bytes.
        limit: usize,
    },

    /// The response body does not match the expected schema.
    #[error("Failed to decode user list: {0}")]
    Decode(#[from] serde_json::Error),
}
