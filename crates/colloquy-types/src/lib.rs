//! Shared type definitions for the Colloquy conversation viewer.
//!
//! This crate is the single source of truth for all types that cross crate
//! boundaries in the Colloquy workspace: the conversation data model, the
//! authoritative state snapshot, and the wire event union delivered over the
//! live socket channel.
//!
//! # Modules
//!
//! - [`roster`] -- Agents and their roles
//! - [`conversation`] -- Turns, reactions, and finalized rounds
//! - [`snapshot`] -- The authoritative application snapshot
//! - [`events`] -- The tagged wire event union

pub mod conversation;
pub mod events;
pub mod roster;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use conversation::{HUMAN_SPEAKER_ID, PublicTurn, Reaction, RoundResult, VisualSpec};
pub use events::ServerEvent;
pub use roster::{Agent, Role};
pub use snapshot::StateSnapshot;
