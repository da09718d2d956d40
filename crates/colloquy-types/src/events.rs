//! The wire event union delivered over the live socket channel.
//!
//! The server broadcasts three event kinds, externally tagged on `"type"`:
//!
//! - `state` -- a full [`StateSnapshot`] replacement
//! - `turn` -- one turn of an in-progress round
//! - `round` -- a finalized round with metrics and the post-round snapshot
//!
//! Events are transient: each is consumed exactly once by the ingest layer.
//! Frames that do not decode into this union are dropped by the transport.

use serde::{Deserialize, Serialize};

use crate::conversation::{PublicTurn, RoundResult};
use crate::snapshot::StateSnapshot;

/// One decoded message from the live event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full authoritative snapshot replacement.
    State {
        /// The replacement snapshot.
        state_snapshot: Box<StateSnapshot>,
    },
    /// One turn of the round currently being produced.
    Turn {
        /// The turn to reveal.
        turn: PublicTurn,
        /// Round the turn belongs to.
        round_number: u64,
    },
    /// A finalized round, its metrics, and the post-round snapshot.
    Round {
        /// The completed round.
        round_result: RoundResult,
        /// Opaque round metrics (duplicated from the round result on the wire).
        metrics: serde_json::Value,
        /// Snapshot to apply once the round's turns have drained.
        state_snapshot: Box<StateSnapshot>,
    },
}
