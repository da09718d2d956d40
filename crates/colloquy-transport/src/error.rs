//! Error types for the transport layer.

/// Errors produced by the transport layer.
///
/// None of these are fatal to the client: connect and socket errors feed
/// the backoff loop, and only endpoint errors surface at construction time.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The configured base address cannot be turned into a socket endpoint.
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint {
        /// The offending address as given.
        endpoint: String,
        /// Explanation of what is wrong with it.
        reason: String,
    },

    /// A connection attempt failed before the socket was established.
    #[error("connect failed: {0}")]
    Connect(String),

    /// An established socket failed mid-stream.
    #[error("socket error: {0}")]
    Socket(String),
}
