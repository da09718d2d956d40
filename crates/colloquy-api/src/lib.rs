//! Command/query HTTP client for the Colloquy simulation server.
//!
//! The synchronization core never calls these operations itself: they are
//! fire-and-forget triggers whose only observable effect, from the core's
//! perspective, is future events on the transport stream. This crate gives
//! the surrounding application a typed, validated way to issue them.
//!
//! Requests are validated locally before any bytes leave the process, so
//! out-of-range payloads fail fast with a [`ApiError::InvalidRequest`]
//! instead of a server round trip. When an admin credential is configured
//! it is attached as an `x-admin-token` header; the event socket never
//! carries it.

pub mod client;
pub mod error;
pub mod requests;

pub use client::ApiClient;
pub use error::ApiError;
pub use requests::{
    AddAgentsRequest, AgentsAdded, ChatMessageInput, ChatRequest, InterveneRequest, ResetRequest,
    RunOutcome, RunRequest, TopicRequest, TtsRequest, UserAgentInput,
};
