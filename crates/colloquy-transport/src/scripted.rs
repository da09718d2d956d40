//! Deterministic scripted double for the connection seam.
//!
//! A [`ScriptedConnector`] replays a fixed sequence of dial outcomes, each
//! successful dial yielding a [`ScriptedConnection`] that replays a fixed
//! sequence of frames. Together with a paused tokio clock this makes the
//! whole reconnect/reveal pipeline testable without sockets or wall time.

use std::collections::VecDeque;

use colloquy_types::ServerEvent;

use crate::connection::{Connection, Connector};
use crate::error::TransportError;

/// One step in a scripted connection's frame sequence.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Deliver a raw text frame.
    Text(String),
    /// Fail the socket with the given message.
    Fail(String),
    /// Close the connection in an orderly fashion.
    Close,
    /// Park forever; only teardown ends the connection.
    Hold,
}

impl ScriptStep {
    /// Encode a [`ServerEvent`] as the text frame the server would send.
    pub fn event(event: &ServerEvent) -> Self {
        Self::Text(serde_json::to_string(event).unwrap_or_default())
    }
}

/// A connection that replays a scripted frame sequence.
///
/// An exhausted script behaves like an orderly close.
#[derive(Debug, Default)]
pub struct ScriptedConnection {
    steps: VecDeque<ScriptStep>,
}

impl ScriptedConnection {
    /// Build a connection from a frame script.
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }
}

impl Connection for ScriptedConnection {
    async fn next_text(&mut self) -> Option<Result<String, TransportError>> {
        match self.steps.pop_front() {
            Some(ScriptStep::Text(frame)) => Some(Ok(frame)),
            Some(ScriptStep::Fail(message)) => Some(Err(TransportError::Socket(message))),
            Some(ScriptStep::Close) | None => None,
            Some(ScriptStep::Hold) => std::future::pending().await,
        }
    }

    async fn close(&mut self) {
        self.steps.clear();
    }
}

/// A dialer that replays a fixed sequence of dial outcomes.
///
/// Once the sequence is exhausted every further dial fails, keeping the
/// client in its backoff loop until it is torn down.
#[derive(Debug, Default)]
pub struct ScriptedConnector {
    dials: VecDeque<Result<ScriptedConnection, TransportError>>,
}

impl ScriptedConnector {
    /// Build a connector from a sequence of dial outcomes.
    pub fn new(dials: impl IntoIterator<Item = Result<ScriptedConnection, TransportError>>) -> Self {
        Self {
            dials: dials.into_iter().collect(),
        }
    }

    /// Convenience: a single successful dial delivering the given events
    /// followed by an orderly close.
    pub fn single_session(events: &[ServerEvent]) -> Self {
        let mut steps: Vec<ScriptStep> = events.iter().map(ScriptStep::event).collect();
        steps.push(ScriptStep::Close);
        Self::new([Ok(ScriptedConnection::new(steps))])
    }
}

impl Connector for ScriptedConnector {
    type Conn = ScriptedConnection;

    async fn connect(&mut self) -> Result<ScriptedConnection, TransportError> {
        self.dials
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connect("script exhausted".to_owned())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_connection_replays_frames_then_closes() {
        let mut conn = ScriptedConnection::new([
            ScriptStep::Text("one".to_owned()),
            ScriptStep::Fail("boom".to_owned()),
        ]);
        assert_eq!(conn.next_text().await.unwrap().unwrap(), "one");
        assert!(conn.next_text().await.unwrap().is_err());
        assert!(conn.next_text().await.is_none());
    }

    #[tokio::test]
    async fn exhausted_connector_fails_dials() {
        let mut connector = ScriptedConnector::default();
        assert!(connector.connect().await.is_err());
    }
}
