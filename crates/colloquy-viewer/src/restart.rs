//! Logical-restart detection.
//!
//! The sync engine's `reset()` must be invoked whenever the user triggers
//! a topic change, a full reset, or a demo load. Those commands run
//! outside this process, so the viewer infers them from the snapshot
//! stream: a new topic or a regressed round counter can only mean the
//! conversation restarted server-side.

/// Tracks snapshot identity across `state` events.
#[derive(Debug, Default)]
pub struct RestartDetector {
    last: Option<(String, u64)>,
}

impl RestartDetector {
    /// Create a detector that has seen nothing yet.
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Observe a snapshot's topic and round counter.
    ///
    /// Returns `true` when the snapshot indicates a logical restart, in
    /// which case the caller must funnel a `reset()` into the engine.
    pub fn observe(&mut self, topic: &str, round_number: u64) -> bool {
        let restarted = self.last.as_ref().is_some_and(|(last_topic, last_round)| {
            last_topic != topic || round_number < *last_round
        });
        self.last = Some((topic.to_owned(), round_number));
        restarted
    }
}
