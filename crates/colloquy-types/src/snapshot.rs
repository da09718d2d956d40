//! The authoritative application snapshot.
//!
//! A [`StateSnapshot`] is a full replacement of the application-visible
//! state. It is never patched field-by-field: the server always sends the
//! complete model and the client swaps it in wholesale, so the visible
//! round counter and roster can never drift from what the server believes.

use serde::{Deserialize, Serialize};

use crate::conversation::{PublicTurn, Reaction};
use crate::roster::Agent;

/// Full authoritative copy of the server-side conversation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// The conversation topic.
    pub topic: String,
    /// Number of completed rounds.
    #[serde(default)]
    pub round_number: u64,
    /// The current roster.
    #[serde(default)]
    pub agents: Vec<Agent>,
    /// Every turn spoken so far, in order.
    #[serde(default)]
    pub public_history: Vec<PublicTurn>,
    /// Every reaction recorded so far.
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    /// Opaque world-state payload (last pattern, metrics, speaker ids).
    #[serde(default)]
    pub world_state: serde_json::Value,
    /// Summary of an uploaded dataset, empty when none is loaded.
    #[serde(default)]
    pub dataset_summary: String,
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self {
            topic: String::new(),
            round_number: 0,
            agents: Vec::new(),
            public_history: Vec::new(),
            reactions: Vec::new(),
            world_state: serde_json::Value::Null,
            dataset_summary: String::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_decodes_minimal_payload() {
        let snapshot: StateSnapshot = serde_json::from_value(serde_json::json!({
            "topic": "Untitled classroom inquiry"
        }))
        .unwrap();
        assert_eq!(snapshot.round_number, 0);
        assert!(snapshot.agents.is_empty());
        assert!(snapshot.world_state.is_null());
    }

    #[test]
    fn default_snapshot_is_empty() {
        let snapshot = StateSnapshot::default();
        assert!(snapshot.topic.is_empty());
        assert!(snapshot.public_history.is_empty());
    }
}
