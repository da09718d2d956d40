//! The read-only view model served to observers.
//!
//! The engine rebuilds this projection after every state change and parks
//! it behind a read-write lock, so presentation code can read a consistent
//! picture at any time without ever touching engine internals.

use colloquy_types::{PublicTurn, Reaction, RoundResult, StateSnapshot};
use serde::Serialize;

use crate::transcript::LiveTurn;

/// A finalized round as recorded in local history.
///
/// Reactions live here and nowhere else: they become visible exactly when
/// their round folds in, never before.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundRecord {
    /// Monotonic round counter.
    pub round_number: u64,
    /// The round's turns in speaking order (authoritative list).
    pub turns: Vec<PublicTurn>,
    /// Reactions from non-speaking agents, now visible.
    pub reactions: Vec<Reaction>,
    /// One-line emergent pattern description.
    pub emergent_pattern: String,
    /// Opaque per-round metrics.
    pub metrics: serde_json::Value,
}

impl From<RoundResult> for RoundRecord {
    fn from(round: RoundResult) -> Self {
        Self {
            round_number: round.round_number,
            turns: round.turns,
            reactions: round.reactions,
            emergent_pattern: round.emergent_pattern,
            metrics: round.metrics,
        }
    }
}

/// Everything an observer needs to paint the screen.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewModel {
    /// The authoritative application snapshot.
    pub snapshot: StateSnapshot,
    /// Finalized rounds, oldest first.
    pub history: Vec<RoundRecord>,
    /// The live transcript: revealed turns of the round in progress plus
    /// locally injected human turns.
    pub live: Vec<LiveTurn>,
}

impl ViewModel {
    /// Total number of reactions currently visible.
    pub fn visible_reactions(&self) -> usize {
        self.history.iter().map(|r| r.reactions.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reactions_count_spans_history() {
        let reaction = Reaction {
            agent_id: "u_ada_1111111111".to_owned(),
            emoji: "✨".to_owned(),
            micro_comment: "Pattern spotted, still open.".to_owned(),
        };
        let record = |n: u64, count: usize| RoundRecord {
            round_number: n,
            turns: Vec::new(),
            reactions: vec![reaction.clone(); count],
            emergent_pattern: String::new(),
            metrics: serde_json::Value::Null,
        };
        let view = ViewModel {
            snapshot: StateSnapshot::default(),
            history: vec![record(1, 2), record(2, 3)],
            live: Vec::new(),
        };
        assert_eq!(view.visible_reactions(), 5);
    }
}
