//! Production `WebSocket` implementation of the connection seam.
//!
//! The socket endpoint is derived from the configured HTTP base address by
//! switching the scheme to its socket equivalent and appending the `ws`
//! path segment, matching how the server mounts its event stream. The
//! channel carries no authentication; credentials belong to the separate
//! command layer.

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;
use url::Url;

use crate::connection::{Connection, Connector};
use crate::error::TransportError;

/// Derive the socket endpoint from an HTTP(S) base address.
///
/// `http` becomes `ws`, `https` becomes `wss`, and an already-socket scheme
/// passes through. The `ws` path segment is appended to whatever path the
/// base carries.
///
/// # Errors
///
/// Returns [`TransportError::InvalidEndpoint`] if the base does not parse
/// or uses a scheme with no socket equivalent.
pub fn derive_socket_endpoint(base: &str) -> Result<Url, TransportError> {
    let mut url = Url::parse(base).map_err(|e| TransportError::InvalidEndpoint {
        endpoint: base.to_owned(),
        reason: e.to_string(),
    })?;

    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        "ws" => "ws",
        "wss" => "wss",
        other => {
            return Err(TransportError::InvalidEndpoint {
                endpoint: base.to_owned(),
                reason: format!("scheme {other} has no socket equivalent"),
            });
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| TransportError::InvalidEndpoint {
            endpoint: base.to_owned(),
            reason: format!("cannot switch scheme to {scheme}"),
        })?;

    url.path_segments_mut()
        .map_err(|()| TransportError::InvalidEndpoint {
            endpoint: base.to_owned(),
            reason: "address cannot carry a path".to_owned(),
        })?
        .pop_if_empty()
        .push("ws");

    Ok(url)
}

/// Dialer for the production `WebSocket` connection.
#[derive(Debug, Clone)]
pub struct WsConnector {
    endpoint: Url,
}

impl WsConnector {
    /// Create a connector for an already-derived socket endpoint.
    pub const fn new(endpoint: Url) -> Self {
        Self { endpoint }
    }

    /// Create a connector from a configured HTTP(S) base address.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidEndpoint`] if the base address is
    /// unusable; this is the only endpoint failure surfaced eagerly.
    pub fn from_base(base: &str) -> Result<Self, TransportError> {
        Ok(Self::new(derive_socket_endpoint(base)?))
    }

    /// The socket endpoint this connector dials.
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Connector for WsConnector {
    type Conn = WsConnection;

    async fn connect(&mut self) -> Result<WsConnection, TransportError> {
        debug!(endpoint = %self.endpoint, "dialing event stream");
        let (stream, _response) = connect_async(self.endpoint.as_str())
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        Ok(WsConnection { stream })
    }
}

/// An established `tokio-tungstenite` connection.
pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Connection for WsConnection {
    async fn next_text(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Ping(payload)) => {
                    if let Err(e) = self.stream.send(Message::Pong(payload)).await {
                        return Some(Err(TransportError::Socket(e.to_string())));
                    }
                }
                Ok(Message::Close(_)) => return None,
                // The wire is JSON text; binary and pong frames carry nothing.
                Ok(_) => {}
                Err(e) => return Some(Err(TransportError::Socket(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}

impl std::fmt::Debug for WsConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsConnection").finish_non_exhaustive()
    }
}
