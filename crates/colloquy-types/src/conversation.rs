//! Conversation content types: turns, reactions, and finalized rounds.
//!
//! A **turn** is one utterance by one speaker. A **round** is the atomic
//! batch of turns, reactions, and metrics produced by a single simulation
//! step. Reactions are meaningful only once their round is finalized.

use serde::{Deserialize, Serialize};

/// Reserved speaker identifier for turns submitted by the local user.
///
/// A turn with this speaker arriving over the transport is an echo of a
/// local submission rebroadcast to other observers and must be dropped by
/// the ingest layer; only the intervention path may add such turns to the
/// visible stream.
pub const HUMAN_SPEAKER_ID: &str = "human";

/// A visual contribution attached to a turn.
///
/// The payload is opaque to the synchronization layer and is forwarded
/// untouched to presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualSpec {
    /// Kind of visual (bar chart, table, scatter, ...); presentation decides.
    pub visual_type: String,
    /// Title shown above the rendered visual.
    pub title: String,
    /// Opaque chart payload.
    pub data: serde_json::Value,
    /// Optional one-line caption.
    #[serde(default)]
    pub description: String,
}

/// One utterance by one speaker within a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicTurn {
    /// Speaker's agent identifier, or [`HUMAN_SPEAKER_ID`] for the local user.
    pub speaker_id: String,
    /// The utterance text.
    pub message: String,
    /// Optional visual contribution, forwarded untouched.
    #[serde(default)]
    pub visual: Option<VisualSpec>,
}

impl PublicTurn {
    /// Whether this turn carries the reserved local-user speaker identifier.
    pub fn is_human(&self) -> bool {
        self.speaker_id == HUMAN_SPEAKER_ID
    }
}

/// A short emoji-plus-comment response attached to a finalized round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// Identifier of the reacting agent.
    pub agent_id: String,
    /// Single emoji.
    pub emoji: String,
    /// Micro comment, at most a few words.
    pub micro_comment: String,
}

/// The atomic result of one simulation round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Monotonic round counter.
    pub round_number: u64,
    /// Identifiers of the agents that spoke this round, in speaking order.
    pub speaker_ids: Vec<String>,
    /// The round's turns in speaking order. This list is authoritative:
    /// it is what History records even if individual turn events were lost.
    pub turns: Vec<PublicTurn>,
    /// Reactions from non-speaking agents.
    pub reactions: Vec<Reaction>,
    /// One-line description of the emergent pattern the round surfaced.
    #[serde(default)]
    pub emergent_pattern: String,
    /// Opaque per-round metrics payload.
    #[serde(default)]
    pub metrics: serde_json::Value,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn human_turn_is_detected() {
        let turn = PublicTurn {
            speaker_id: HUMAN_SPEAKER_ID.to_owned(),
            message: "What about cost?".to_owned(),
            visual: None,
        };
        assert!(turn.is_human());
    }

    #[test]
    fn agent_turn_is_not_human() {
        let turn = PublicTurn {
            speaker_id: "m_librarian_ab12cd34ef".to_owned(),
            message: "An emergent pattern: everyone cites evidence.".to_owned(),
            visual: None,
        };
        assert!(!turn.is_human());
    }

    #[test]
    fn turn_visual_round_trips_opaquely() {
        let raw = serde_json::json!({
            "speaker_id": "u_maya_0a1b2c3d4e",
            "message": "Here is the spread.",
            "visual": {
                "visual_type": "bar_chart",
                "title": "Responses by cohort",
                "data": {"labels": ["a", "b"], "values": [3, 9]},
                "description": "Counts per cohort."
            }
        });
        let turn: PublicTurn = serde_json::from_value(raw.clone()).unwrap();
        let visual = turn.visual.as_ref().unwrap();
        assert_eq!(visual.visual_type, "bar_chart");
        // The data payload must survive untouched.
        assert_eq!(serde_json::to_value(&turn).unwrap(), raw);
    }

    #[test]
    fn round_result_defaults_optional_fields() {
        let round: RoundResult = serde_json::from_value(serde_json::json!({
            "round_number": 3,
            "speaker_ids": ["u_maya_0a1b2c3d4e"],
            "turns": [{"speaker_id": "u_maya_0a1b2c3d4e", "message": "Hello."}],
            "reactions": []
        }))
        .unwrap();
        assert_eq!(round.round_number, 3);
        assert!(round.emergent_pattern.is_empty());
        assert!(round.metrics.is_null());
    }
}
