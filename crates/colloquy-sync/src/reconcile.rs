//! The authoritative snapshot owner.
//!
//! Exactly one [`StateSnapshot`] exists per session; it is replaced
//! wholesale and never patched. `state` events replace it the moment they
//! arrive. The snapshot attached to a `round` event is applied by the
//! engine only at drain completion, so the visible round counter and
//! roster never run ahead of the visible conversation.

use colloquy_types::StateSnapshot;
use tracing::debug;

/// Owner of the single authoritative application snapshot.
#[derive(Debug, Default)]
pub struct StateReconciler {
    current: StateSnapshot,
}

impl StateReconciler {
    /// Create a reconciler holding an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot wholesale.
    pub fn apply(&mut self, snapshot: StateSnapshot) {
        debug!(
            topic = %snapshot.topic,
            round_number = snapshot.round_number,
            agents = snapshot.agents.len(),
            "snapshot replaced"
        );
        self.current = snapshot;
    }

    /// The current authoritative snapshot.
    pub const fn current(&self) -> &StateSnapshot {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_replaces_wholesale() {
        let mut reconciler = StateReconciler::new();
        reconciler.apply(StateSnapshot {
            topic: "First".to_owned(),
            round_number: 3,
            ..StateSnapshot::default()
        });
        reconciler.apply(StateSnapshot {
            topic: "Second".to_owned(),
            ..StateSnapshot::default()
        });

        // Nothing from the first snapshot survives the second.
        assert_eq!(reconciler.current().topic, "Second");
        assert_eq!(reconciler.current().round_number, 0);
    }
}
