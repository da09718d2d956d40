//! Error types for the command/query client.

/// Errors produced by the command/query client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The configured base address is unusable.
    #[error("invalid base address {base}: {reason}")]
    InvalidBase {
        /// The offending address as given.
        base: String,
        /// Explanation of what is wrong with it.
        reason: String,
    },

    /// A request payload failed local validation; nothing was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] validator::ValidationErrors),

    /// The HTTP call itself failed (connect, timeout, protocol).
    #[error("request failed: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, as far as it could be read.
        body: String,
    },

    /// The response body did not decode into the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),
}
