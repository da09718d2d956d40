//! The connection seam between the transport task and the wire.
//!
//! [`Connector`] dials; [`Connection`] reads text frames until the peer
//! goes away. The production implementation lives in [`crate::ws`]; the
//! deterministic double used by timing tests lives in [`crate::scripted`].
//! Both traits use explicit `impl Future + Send` returns so generic
//! transport tasks can be spawned onto the runtime.

use std::future::Future;

use crate::error::TransportError;

/// Coarse connection state reported to the rest of the application.
///
/// Transitions happen only inside the transport task: `Connecting` on every
/// dial attempt, `Connected` on a successful open, `Disconnected` on error
/// or close. Callers observe failure exclusively through this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// A dial attempt is in flight.
    Connecting,
    /// The event stream is live.
    Connected,
    /// The channel is down; a reconnect is pending unless torn down.
    Disconnected,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// An established connection yielding inbound text frames.
pub trait Connection: Send {
    /// Receive the next text frame.
    ///
    /// Returns `None` on orderly close, `Some(Err(_))` on a socket failure.
    /// After either, the connection is dead and must be dropped.
    fn next_text(
        &mut self,
    ) -> impl Future<Output = Option<Result<String, TransportError>>> + Send;

    /// Close the connection, ignoring errors (it is being discarded).
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// A dialer producing fresh [`Connection`]s, once per reconnect attempt.
pub trait Connector: Send + 'static {
    /// The connection type this dialer produces.
    type Conn: Connection;

    /// Attempt to establish a new connection.
    fn connect(&mut self) -> impl Future<Output = Result<Self::Conn, TransportError>> + Send;
}
