//! Event classification and routing.
//!
//! Each decoded [`ServerEvent`] is classified into one of three routes:
//! snapshots go straight to the reconciler, turns to the reveal queue,
//! rounds to the pending-round gate. Transport turns carrying the human
//! sentinel speaker are echoes of a local submission rebroadcast to other
//! observers; they are dropped here unconditionally so a local injection
//! can never be duplicated.

use colloquy_types::{PublicTurn, ServerEvent, StateSnapshot};
use tracing::{debug, warn};

use crate::reveal::PendingRound;

/// A classified event, ready for its owning component.
#[derive(Debug)]
pub enum RoutedEvent {
    /// Apply immediately and unconditionally.
    Snapshot(Box<StateSnapshot>),
    /// Queue for paced reveal.
    Turn {
        /// The turn to reveal.
        turn: PublicTurn,
        /// Round the turn belongs to.
        round_number: u64,
    },
    /// Hold until the round's turns have drained.
    Round(PendingRound),
}

/// Stateful classifier for the inbound event stream.
#[derive(Debug, Default)]
pub struct EventIngestor {
    human_turns_dropped: u64,
}

impl EventIngestor {
    /// Create a fresh ingestor.
    pub const fn new() -> Self {
        Self {
            human_turns_dropped: 0,
        }
    }

    /// Classify one event. Returns `None` when the event is dropped.
    pub fn route(&mut self, event: ServerEvent) -> Option<RoutedEvent> {
        match event {
            ServerEvent::State { state_snapshot } => {
                debug!(
                    topic = %state_snapshot.topic,
                    round_number = state_snapshot.round_number,
                    "snapshot received"
                );
                Some(RoutedEvent::Snapshot(state_snapshot))
            }
            ServerEvent::Turn { turn, round_number } => {
                if turn.is_human() {
                    // The server is expected to rebroadcast human turns to
                    // other observers only; seeing one here means that
                    // assumption broke upstream.
                    self.human_turns_dropped = self.human_turns_dropped.saturating_add(1);
                    warn!(
                        dropped_so_far = self.human_turns_dropped,
                        "dropping echoed human turn from transport"
                    );
                    return None;
                }
                Some(RoutedEvent::Turn { turn, round_number })
            }
            ServerEvent::Round {
                mut round_result,
                metrics,
                state_snapshot,
            } => {
                // The wire duplicates metrics at the event level; prefer the
                // copy inside the round record when it is populated.
                if round_result.metrics.is_null() {
                    round_result.metrics = metrics;
                }
                debug!(
                    round_number = round_result.round_number,
                    turns = round_result.turns.len(),
                    "round finalized event received"
                );
                Some(RoutedEvent::Round(PendingRound {
                    round: round_result,
                    snapshot: state_snapshot,
                }))
            }
        }
    }

    /// How many echoed human turns have been suppressed.
    ///
    /// Non-zero means the rebroadcast assumption was violated upstream.
    pub const fn human_turns_dropped(&self) -> u64 {
        self.human_turns_dropped
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use colloquy_types::HUMAN_SPEAKER_ID;

    use super::*;

    fn turn_event(speaker: &str) -> ServerEvent {
        ServerEvent::Turn {
            turn: PublicTurn {
                speaker_id: speaker.to_owned(),
                message: "hello".to_owned(),
                visual: None,
            },
            round_number: 1,
        }
    }

    #[test]
    fn agent_turns_are_routed() {
        let mut ingest = EventIngestor::new();
        let routed = ingest.route(turn_event("u_ada_1111111111"));
        assert!(matches!(routed, Some(RoutedEvent::Turn { .. })));
        assert_eq!(ingest.human_turns_dropped(), 0);
    }

    #[test]
    fn human_turns_are_dropped_unconditionally() {
        let mut ingest = EventIngestor::new();
        assert!(ingest.route(turn_event(HUMAN_SPEAKER_ID)).is_none());
        assert!(ingest.route(turn_event(HUMAN_SPEAKER_ID)).is_none());
        assert_eq!(ingest.human_turns_dropped(), 2);
    }

    #[test]
    fn round_event_inherits_event_level_metrics() {
        let mut ingest = EventIngestor::new();
        let event: ServerEvent = serde_json::from_value(serde_json::json!({
            "type": "round",
            "round_result": {
                "round_number": 2,
                "speaker_ids": [],
                "turns": [],
                "reactions": []
            },
            "metrics": {"novelty": 0.8},
            "state_snapshot": {"topic": "t"}
        }))
        .unwrap();

        match ingest.route(event) {
            Some(RoutedEvent::Round(pending)) => {
                assert_eq!(pending.round.metrics, serde_json::json!({"novelty": 0.8}));
            }
            other => panic!("unexpected route: {other:?}"),
        }
    }
}
