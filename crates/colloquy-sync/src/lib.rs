//! Turn reveal engine for the Colloquy conversation viewer.
//!
//! This crate reconciles three independent event sources -- full-state
//! snapshots, individual turns, and finalized rounds -- into one ordered,
//! human-paced display stream. Turns are revealed one at a time on a fixed
//! dwell cadence; a round is folded into history (and its reactions made
//! visible) only once every one of its turns has completed its reveal
//! dwell, regardless of network arrival order. Locally submitted human
//! turns bypass the queue and appear synchronously.
//!
//! All mutable state is owned by a single engine task. Timers are armed as
//! [`reveal::TimerRequest`] values carrying a generation token
//! ([`reveal::Epoch`]); a stale token makes a late timer callback a
//! structural no-op, so `reset()` can never race an in-flight dwell.
//!
//! # Modules
//!
//! - [`transcript`] -- The live display transcript
//! - [`reveal`] -- The reveal scheduler state machine
//! - [`ingest`] -- Event classification and human-echo suppression
//! - [`reconcile`] -- The authoritative snapshot owner
//! - [`view`] -- The read-only view model projection
//! - [`engine`] -- The async driver task and its handle

pub mod engine;
pub mod error;
pub mod ingest;
pub mod reconcile;
pub mod reveal;
pub mod transcript;
pub mod view;

pub use engine::{EngineCommand, RevealNotice, SyncHandle, spawn_sync_engine};
pub use error::EngineClosed;
pub use ingest::{EventIngestor, RoutedEvent};
pub use reconcile::StateReconciler;
pub use reveal::{
    Advance, DwellKind, Epoch, PendingRound, RevealScheduler, RevealTiming, RevealedTurn,
    TimerRequest,
};
pub use transcript::{LiveTranscript, LiveTurn, TurnOrigin};
pub use view::{RoundRecord, ViewModel};
