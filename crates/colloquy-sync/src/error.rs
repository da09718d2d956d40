//! Error types for the sync engine.

/// The engine task has stopped and can no longer accept commands.
///
/// This happens only after the event stream and every handle are gone;
/// during normal operation commands cannot fail.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("sync engine is no longer running")]
pub struct EngineClosed;
