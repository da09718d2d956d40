//! The transport task: dial, decode, forward, back off, repeat.
//!
//! [`spawn_transport`] starts one background task that owns the connection
//! for its whole life. The task dials through the supplied [`Connector`],
//! decodes inbound text frames into [`ServerEvent`]s, forwards them on a
//! bounded channel, and publishes coarse status transitions on a watch
//! channel. Frames that fail to decode are dropped silently -- no callback,
//! no status change, no crash.
//!
//! Teardown is cooperative: [`TransportHandle::shutdown`] cancels any
//! pending reconnect sleep, closes an open or in-flight connection, and
//! guarantees no further reconnect attempts.

use std::time::Duration;

use colloquy_types::ServerEvent;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::backoff::{Backoff, BackoffPolicy};
use crate::connection::{Connection, ConnectionStatus, Connector};

/// Default capacity of the bounded event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default timeout for the graceful shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for the transport task.
#[derive(Debug, Clone, Copy)]
pub struct TransportConfig {
    /// Reconnect delay policy.
    pub backoff: BackoffPolicy,
    /// Capacity of the bounded event channel.
    pub event_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            backoff: BackoffPolicy::default(),
            event_capacity: EVENT_CHANNEL_CAPACITY,
        }
    }
}

/// Handle to a running transport task.
///
/// Dropping the handle aborts the task; prefer [`Self::shutdown`] for an
/// orderly teardown that closes the socket.
#[derive(Debug)]
pub struct TransportHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    status_rx: watch::Receiver<ConnectionStatus>,
    task: Option<JoinHandle<()>>,
}

impl TransportHandle {
    /// The current connection status.
    pub fn status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    /// A watch receiver observing every status transition.
    pub fn status_stream(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    /// Tear the transport down: no further reconnects, pending reconnect
    /// timers cancelled, any open or in-flight connection closed.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!(error = %join_err, "transport task ended abnormally");
                }
                Err(_) => {
                    warn!("transport task did not exit in time; aborting");
                    task.abort();
                }
            }
        }
    }
}

impl Drop for TransportHandle {
    fn drop(&mut self) {
        // Drop is synchronous, so the graceful path is unavailable; abort
        // the task so it cannot outlive its handle.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Spawn the transport task.
///
/// Returns the control handle and the receiving end of the decoded event
/// stream. The task starts dialing immediately.
pub fn spawn_transport<C: Connector>(
    connector: C,
    config: TransportConfig,
) -> (TransportHandle, mpsc::Receiver<ServerEvent>) {
    let (event_tx, event_rx) = mpsc::channel(config.event_capacity.max(1));
    let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let backoff = Backoff::new(config.backoff);
    let task = tokio::spawn(transport_loop(
        connector,
        backoff,
        event_tx,
        status_tx,
        shutdown_rx,
    ));

    (
        TransportHandle {
            shutdown_tx: Some(shutdown_tx),
            status_rx,
            task: Some(task),
        },
        event_rx,
    )
}

/// Why a connected session ended.
enum SessionEnd {
    /// The socket closed or failed; reconnect after backoff.
    Lost,
    /// Teardown was requested mid-session.
    TornDown,
    /// The event receiver was dropped; nobody is listening.
    ReceiverGone,
}

/// The connect/read/backoff loop.
async fn transport_loop<C: Connector>(
    mut connector: C,
    mut backoff: Backoff,
    events: mpsc::Sender<ServerEvent>,
    status: watch::Sender<ConnectionStatus>,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        let _ = status.send(ConnectionStatus::Connecting);

        let dialed = tokio::select! {
            result = connector.connect() => result,
            _ = &mut shutdown => break,
        };

        match dialed {
            Ok(mut conn) => {
                let _ = status.send(ConnectionStatus::Connected);
                backoff.reset();
                debug!("event stream connected");

                let end = read_session(&mut conn, &events, &mut shutdown).await;
                let _ = status.send(ConnectionStatus::Disconnected);
                match end {
                    SessionEnd::Lost => {}
                    SessionEnd::TornDown | SessionEnd::ReceiverGone => {
                        conn.close().await;
                        break;
                    }
                }
            }
            Err(error) => {
                debug!(error = %error, "connect attempt failed");
                let _ = status.send(ConnectionStatus::Disconnected);
            }
        }

        if events.is_closed() {
            break;
        }

        let delay = backoff.next_delay();
        debug!(delay = ?delay, "reconnect scheduled");
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            _ = &mut shutdown => break,
        }
    }

    let _ = status.send(ConnectionStatus::Disconnected);
    debug!("transport torn down");
}

/// Read frames from one connection until it dies or teardown is requested.
async fn read_session<C: Connection>(
    conn: &mut C,
    events: &mpsc::Sender<ServerEvent>,
    shutdown: &mut oneshot::Receiver<()>,
) -> SessionEnd {
    loop {
        tokio::select! {
            inbound = conn.next_text() => match inbound {
                Some(Ok(frame)) => match serde_json::from_str::<ServerEvent>(&frame) {
                    Ok(event) => {
                        if events.send(event).await.is_err() {
                            return SessionEnd::ReceiverGone;
                        }
                    }
                    // Malformed frames are dropped without surfacing anything.
                    Err(error) => trace!(error = %error, "dropping undecodable frame"),
                },
                Some(Err(error)) => {
                    debug!(error = %error, "event stream failed");
                    return SessionEnd::Lost;
                }
                None => {
                    debug!("event stream closed by server");
                    return SessionEnd::Lost;
                }
            },
            _ = &mut *shutdown => return SessionEnd::TornDown,
        }
    }
}
