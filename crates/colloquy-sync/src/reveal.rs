//! The reveal scheduler: a timer-driven state machine that paces turn
//! display independent of delivery speed and gates round finalization on
//! full reveal.
//!
//! The scheduler never touches the clock itself. Each operation may return
//! a [`TimerRequest`] telling the driver to call [`RevealScheduler::timer_fired`]
//! after a dwell; the request carries the scheduler's current [`Epoch`],
//! and `timer_fired` ignores any token minted before the latest `reset()`.
//! Stale-callback bugs are therefore structurally impossible rather than
//! defensively handled.
//!
//! # Pacing
//!
//! Turns of the round currently being revealed dequeue one at a time, each
//! dwelling for `turn_dwell`. When the last queued turn of a finalized
//! round is shown, that turn dwells for `round_gap` instead; on expiry the
//! round folds into history, its reactions become visible, and the live
//! transcript collapses to locally injected turns. A `RoundFinalized`
//! arriving before its turns have streamed through never finalizes early:
//! the drain is driven purely by turn reveals.

use std::collections::VecDeque;
use std::time::Duration;

use colloquy_types::{PublicTurn, RoundResult, StateSnapshot};

use crate::transcript::LiveTranscript;

/// Default per-turn dwell in milliseconds.
const TURN_DWELL_MS: u64 = 2400;

/// Default post-round gap in milliseconds.
const ROUND_GAP_MS: u64 = 1200;

/// Generation token minted when a timer is armed.
///
/// `reset()` bumps the scheduler's generation; a token from an earlier
/// generation no longer matches and its timer expiry is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epoch(u64);

/// Which dwell phase a timer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DwellKind {
    /// Per-turn reveal dwell.
    Turn,
    /// Post-round gap before finalization.
    RoundGap,
}

/// An instruction to the driver: fire back after `after`, quoting `epoch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    /// Generation token to quote back to [`RevealScheduler::timer_fired`].
    pub epoch: Epoch,
    /// Dwell phase the timer covers (informational; useful in logs).
    pub kind: DwellKind,
    /// How long to wait before firing.
    pub after: Duration,
}

/// Dwell durations, one constant per phase.
///
/// The two phases are deliberately independent knobs; product owners have
/// not converged on final values, so both are configuration.
#[derive(Debug, Clone, Copy)]
pub struct RevealTiming {
    /// How long each revealed turn holds the spotlight.
    pub turn_dwell: Duration,
    /// Extra dwell on the last turn of a round before it finalizes.
    pub round_gap: Duration,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            turn_dwell: Duration::from_millis(TURN_DWELL_MS),
            round_gap: Duration::from_millis(ROUND_GAP_MS),
        }
    }
}

/// A finalized round held until its turns have drained from the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRound {
    /// The completed round; its turn list is authoritative for history.
    pub round: RoundResult,
    /// Snapshot to hand to the reconciler at drain completion.
    pub snapshot: Box<StateSnapshot>,
}

/// A turn that was just made visible.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealedTurn {
    /// The turn content, as appended to the live transcript.
    pub turn: PublicTurn,
    /// Round the turn belongs to.
    pub round_number: u64,
}

/// What one scheduler step did.
///
/// A single step can both finalize a round and reveal the first turn of
/// the next one (gap expiry with the next round already queued). When
/// both are present the finalization happened first.
#[derive(Debug, Default)]
pub struct Advance {
    /// Round folded into history by this step, if any.
    pub completed: Option<PendingRound>,
    /// Turn made visible by this step, if any.
    pub revealed: Option<RevealedTurn>,
    /// Next timer to arm, if the scheduler is not idle.
    pub timer: Option<TimerRequest>,
}

/// Scheduler phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Nothing queued, nothing draining; no timer armed.
    Idle,
    /// A turn dwell timer is running.
    Revealing,
    /// The post-round gap timer is running.
    Draining,
}

/// A queued turn tagged with its round.
#[derive(Debug)]
struct QueuedTurn {
    turn: PublicTurn,
    round_number: u64,
}

/// The reveal scheduler state machine.
#[derive(Debug)]
pub struct RevealScheduler {
    timing: RevealTiming,
    phase: Phase,
    queue: VecDeque<QueuedTurn>,
    pending: VecDeque<PendingRound>,
    generation: u64,
}

impl RevealScheduler {
    /// Create an idle scheduler with the given dwell policy.
    pub const fn new(timing: RevealTiming) -> Self {
        Self {
            timing,
            phase: Phase::Idle,
            queue: VecDeque::new(),
            pending: VecDeque::new(),
            generation: 0,
        }
    }

    /// The current generation token.
    pub const fn epoch(&self) -> Epoch {
        Epoch(self.generation)
    }

    /// Whether no timer is armed and nothing is queued or pending.
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle && self.queue.is_empty() && self.pending.is_empty()
    }

    /// Number of turns waiting to be revealed.
    pub fn queued_turns(&self) -> usize {
        self.queue.len()
    }

    /// Accept a turn from the stream.
    ///
    /// The turn is queued in arrival order; if no dwell timer is active it
    /// is revealed immediately.
    pub fn enqueue_turn(
        &mut self,
        turn: PublicTurn,
        round_number: u64,
        live: &mut LiveTranscript,
    ) -> Advance {
        self.queue.push_back(QueuedTurn { turn, round_number });
        if self.phase == Phase::Idle {
            self.advance(live)
        } else {
            Advance::default()
        }
    }

    /// Accept a finalized round from the stream.
    ///
    /// The round is never folded in here: it waits until its turns have
    /// drained. If the scheduler is already idle (the turns drained before
    /// the round event arrived, or never arrived at all) the gap dwell
    /// starts immediately.
    pub fn finalize_round(&mut self, pending: PendingRound, live: &mut LiveTranscript) -> Advance {
        self.pending.push_back(pending);
        if self.phase == Phase::Idle {
            self.advance(live)
        } else {
            Advance::default()
        }
    }

    /// Handle a dwell timer expiry.
    ///
    /// Returns `None` if the quoted token predates the latest `reset()`;
    /// the caller must then do nothing at all.
    pub fn timer_fired(&mut self, epoch: Epoch, live: &mut LiveTranscript) -> Option<Advance> {
        if epoch != self.epoch() {
            return None;
        }
        match self.phase {
            // No timer belongs to an idle scheduler; a matching token here
            // would mean the driver fired one it was told to forget.
            Phase::Idle => None,
            Phase::Revealing => {
                self.phase = Phase::Idle;
                Some(self.advance(live))
            }
            Phase::Draining => {
                self.phase = Phase::Idle;
                if !self.front_round_drained() {
                    // A straggler turn for the draining round arrived
                    // during the gap; reveal it before finalizing.
                    return Some(self.advance(live));
                }
                let completed = self.pending.pop_front();
                if completed.is_some() {
                    live.collapse_to_local();
                }
                let mut advance = self.advance(live);
                advance.completed = completed;
                Some(advance)
            }
        }
    }

    /// Logical restart: clear the queue, drop pending rounds, and
    /// invalidate every armed timer by bumping the generation.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.queue.clear();
        self.pending.clear();
        self.phase = Phase::Idle;
    }

    /// From idle, take the next step: drain a ready round, else reveal the
    /// next queued turn.
    fn advance(&mut self, live: &mut LiveTranscript) -> Advance {
        if self.front_round_drained() {
            self.phase = Phase::Draining;
            return Advance {
                timer: Some(self.arm(DwellKind::RoundGap, self.timing.round_gap)),
                ..Advance::default()
            };
        }

        if let Some(next) = self.queue.pop_front() {
            live.push_revealed(next.turn.clone(), next.round_number);
            // If that was the last turn the front pending round was waiting
            // on, its dwell doubles as the pre-finalization gap.
            let (phase, kind, dwell) = if self.front_round_drained() {
                (Phase::Draining, DwellKind::RoundGap, self.timing.round_gap)
            } else {
                (Phase::Revealing, DwellKind::Turn, self.timing.turn_dwell)
            };
            self.phase = phase;
            return Advance {
                revealed: Some(RevealedTurn {
                    turn: next.turn,
                    round_number: next.round_number,
                }),
                timer: Some(self.arm(kind, dwell)),
                ..Advance::default()
            };
        }

        Advance::default()
    }

    /// Whether the oldest pending round has no un-revealed turns left.
    fn front_round_drained(&self) -> bool {
        self.pending.front().is_some_and(|front| {
            !self
                .queue
                .iter()
                .any(|queued| queued.round_number <= front.round.round_number)
        })
    }

    /// Mint a timer request for the current generation.
    const fn arm(&self, kind: DwellKind, after: Duration) -> TimerRequest {
        TimerRequest {
            epoch: Epoch(self.generation),
            kind,
            after,
        }
    }
}
