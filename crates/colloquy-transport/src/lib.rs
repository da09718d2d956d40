//! Resilient `WebSocket` transport client for the Colloquy event stream.
//!
//! This crate owns the one long-lived connection to the simulation server's
//! event socket. It reconnects with exponential backoff, decodes inbound
//! frames into [`colloquy_types::ServerEvent`] values, and reports nothing
//! to the caller beyond a coarse [`ConnectionStatus`] plus the decoded
//! events themselves. Every transport failure is recoverable: the worst
//! observable state is "stuck disconnected", which heals automatically once
//! the server becomes reachable again.
//!
//! The connection resource is expressed as a pair of traits
//! ([`Connector`]/[`Connection`]) with one production implementation
//! ([`WsConnector`]) and one deterministic scripted double
//! ([`scripted::ScriptedConnector`]) so the reconnect and pacing logic can
//! be tested against a logical clock instead of a live socket.
//!
//! # Modules
//!
//! - [`backoff`] -- Reconnect delay policy
//! - [`connection`] -- The connection seam and status type
//! - [`ws`] -- Production `tokio-tungstenite` implementation
//! - [`scripted`] -- Deterministic scripted test double
//! - [`client`] -- The transport task and its handle

pub mod backoff;
pub mod client;
pub mod connection;
pub mod error;
pub mod scripted;
pub mod ws;

pub use backoff::{Backoff, BackoffPolicy};
pub use client::{TransportConfig, TransportHandle, spawn_transport};
pub use connection::{Connection, ConnectionStatus, Connector};
pub use error::TransportError;
pub use ws::{WsConnector, derive_socket_endpoint};
