//! The live display transcript.
//!
//! [`LiveTranscript`] is the ordered sequence of turns currently shown:
//! the already-revealed turns of the in-progress round plus any locally
//! injected human turns. When a round finishes draining the transcript
//! collapses to the local turns only -- those persist across round
//! boundaries until a full reset.

use colloquy_types::PublicTurn;
use serde::Serialize;

/// Where a visible turn came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnOrigin {
    /// Revealed from the transport stream.
    Remote,
    /// Injected locally by the intervention path.
    Local,
}

/// One turn in the live transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveTurn {
    /// The turn content.
    pub turn: PublicTurn,
    /// Round the turn belongs to; `None` for local injections.
    pub round_number: Option<u64>,
    /// Origin of the turn.
    pub origin: TurnOrigin,
}

/// Ordered sequence of currently visible turns.
#[derive(Debug, Default)]
pub struct LiveTranscript {
    turns: Vec<LiveTurn>,
}

impl LiveTranscript {
    /// Create an empty transcript.
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append a remotely revealed turn.
    pub fn push_revealed(&mut self, turn: PublicTurn, round_number: u64) {
        self.turns.push(LiveTurn {
            turn,
            round_number: Some(round_number),
            origin: TurnOrigin::Remote,
        });
    }

    /// Append a locally injected human turn.
    pub fn push_local(&mut self, turn: PublicTurn) {
        self.turns.push(LiveTurn {
            turn,
            round_number: None,
            origin: TurnOrigin::Local,
        });
    }

    /// Drop everything except locally injected turns (round drain).
    pub fn collapse_to_local(&mut self) {
        self.turns.retain(|t| t.origin == TurnOrigin::Local);
    }

    /// Drop everything (full reset).
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// The visible turns in display order.
    pub fn turns(&self) -> &[LiveTurn] {
        &self.turns
    }

    /// Whether nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
