//! Error types for the viewer binary.

use colloquy_api::ApiError;
use colloquy_transport::TransportError;

/// Errors the viewer can hit during startup or shutdown.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Configuration could not be loaded or deserialized.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The transport endpoint could not be derived.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A command/query call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Session log export failed.
    #[error("session log export failed: {0}")]
    Export(#[from] std::io::Error),
}
