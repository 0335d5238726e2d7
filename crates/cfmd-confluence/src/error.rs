//! Error types for Confluence integration.

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Requested page, attachment or search result does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Attachment exceeds [`MAX_ATTACHMENT_SIZE`](crate::MAX_ATTACHMENT_SIZE).
    #[error("attachment '{name}' is too large: {size} bytes (max {max})")]
    AttachmentTooLarge {
        /// Attachment file name.
        name: String,
        /// Reported or received size in bytes.
        size: u64,
        /// Size limit in bytes.
        max: u64,
    },

    /// URL could not be interpreted as a Confluence page or download URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}
