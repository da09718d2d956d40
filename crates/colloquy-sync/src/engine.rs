//! The engine task: one cooperative loop owning every piece of mutable
//! sync state.
//!
//! The task's only suspension points are transport event arrival, command
//! arrival, and dwell timer expiry, so the live transcript, history, and
//! snapshot are mutated from exactly one place. Observers get a broadcast
//! stream of [`RevealNotice`]s for incremental display plus a shared
//! [`ViewModel`] snapshot behind a read-write lock, refreshed after every
//! step.
//!
//! Dwell timers are armed from [`TimerRequest`]s returned by the
//! scheduler. The armed timer's epoch is quoted back on expiry; `reset()`
//! both disarms the driver's timer and bumps the scheduler generation, so
//! even a timer that has already fired cannot mutate post-reset state.

use std::pin::Pin;
use std::sync::Arc;

use colloquy_types::{HUMAN_SPEAKER_ID, PublicTurn, Reaction, ServerEvent};
use tokio::sync::{RwLock, broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Sleep;
use tracing::{debug, info};

use crate::error::EngineClosed;
use crate::ingest::{EventIngestor, RoutedEvent};
use crate::reconcile::StateReconciler;
use crate::reveal::{Advance, DwellKind, Epoch, PendingRound, RevealScheduler, RevealTiming, TimerRequest};
use crate::transcript::LiveTranscript;
use crate::view::{RoundRecord, ViewModel};

/// Capacity of the notice broadcast channel.
///
/// A subscriber that falls further behind than this skips ahead to the
/// newest notice; the shared view model is always complete regardless.
const NOTICE_CAPACITY: usize = 256;

/// Commands accepted by the engine task.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Show a locally submitted human turn immediately.
    Intervene {
        /// The message text.
        message: String,
    },
    /// Logical restart: clear queue, pending round, live view, history,
    /// and invalidate every armed timer.
    Reset,
}

/// Incremental notifications published to observers.
#[derive(Debug, Clone)]
pub enum RevealNotice {
    /// A turn became visible.
    TurnRevealed {
        /// The revealed turn.
        turn: PublicTurn,
        /// Round the turn belongs to.
        round_number: u64,
    },
    /// A locally submitted turn was merged into the live view.
    InterventionMerged {
        /// The injected turn.
        turn: PublicTurn,
    },
    /// A round finished draining; its reactions are now visible.
    RoundFinalized {
        /// The finalized round number.
        round_number: u64,
        /// The now-visible reactions.
        reactions: Vec<Reaction>,
        /// One-line emergent pattern description.
        emergent_pattern: String,
    },
    /// The authoritative snapshot was replaced by a `state` event.
    SnapshotReplaced {
        /// The (possibly new) topic.
        topic: String,
        /// The snapshot's round counter.
        round_number: u64,
    },
    /// The engine was reset.
    EngineReset,
}

/// State shared between the engine task and its observers.
#[derive(Debug)]
struct SyncShared {
    notices: broadcast::Sender<RevealNotice>,
    view: RwLock<ViewModel>,
}

/// Handle to a running engine task.
///
/// Cheap to clone; the task stops once every handle is gone and the event
/// stream has ended.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    commands: mpsc::UnboundedSender<EngineCommand>,
    shared: Arc<SyncShared>,
}

impl SyncHandle {
    /// Merge a locally submitted human turn into the live view now,
    /// without waiting on any transport round trip.
    pub fn intervene(&self, message: impl Into<String>) -> Result<(), EngineClosed> {
        self.send(EngineCommand::Intervene {
            message: message.into(),
        })
    }

    /// Request a logical restart. Must be invoked on topic change, full
    /// reset, or demo load so stale timers cannot mutate fresh state.
    pub fn reset(&self) -> Result<(), EngineClosed> {
        self.send(EngineCommand::Reset)
    }

    /// Subscribe to the incremental notice stream.
    pub fn subscribe(&self) -> broadcast::Receiver<RevealNotice> {
        self.shared.notices.subscribe()
    }

    /// A consistent copy of the current view model.
    pub async fn view(&self) -> ViewModel {
        self.shared.view.read().await.clone()
    }

    fn send(&self, command: EngineCommand) -> Result<(), EngineClosed> {
        self.commands.send(command).map_err(|_| EngineClosed)
    }
}

/// Spawn the engine task.
///
/// `events` is the decoded stream from the transport; `timing` sets the
/// dwell policy. Returns the handle and the task's join handle.
pub fn spawn_sync_engine(
    events: mpsc::Receiver<ServerEvent>,
    timing: RevealTiming,
) -> (SyncHandle, JoinHandle<()>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (notice_tx, _) = broadcast::channel(NOTICE_CAPACITY);
    let shared = Arc::new(SyncShared {
        notices: notice_tx,
        view: RwLock::new(ViewModel::default()),
    });

    let engine = SyncEngine {
        ingest: EventIngestor::new(),
        scheduler: RevealScheduler::new(timing),
        live: LiveTranscript::new(),
        reconciler: StateReconciler::new(),
        history: Vec::new(),
        shared: Arc::clone(&shared),
    };
    let task = tokio::spawn(engine.run(events, command_rx));

    (
        SyncHandle {
            commands: command_tx,
            shared,
        },
        task,
    )
}

/// A dwell timer the driver is currently waiting on.
struct ArmedTimer {
    epoch: Epoch,
    kind: DwellKind,
    sleep: Pin<Box<Sleep>>,
}

impl ArmedTimer {
    fn new(request: TimerRequest) -> Self {
        Self {
            epoch: request.epoch,
            kind: request.kind,
            sleep: Box::pin(tokio::time::sleep(request.after)),
        }
    }
}

/// One step of the driver loop.
enum Step {
    Event(Option<ServerEvent>),
    Command(Option<EngineCommand>),
    Dwell,
}

/// The engine state and its driver loop.
struct SyncEngine {
    ingest: EventIngestor,
    scheduler: RevealScheduler,
    live: LiveTranscript,
    reconciler: StateReconciler,
    history: Vec<RoundRecord>,
    shared: Arc<SyncShared>,
}

impl SyncEngine {
    async fn run(
        mut self,
        mut events: mpsc::Receiver<ServerEvent>,
        mut commands: mpsc::UnboundedReceiver<EngineCommand>,
    ) {
        let mut armed: Option<ArmedTimer> = None;
        let mut events_open = true;

        loop {
            let step = {
                let dwell = async {
                    match armed.as_mut() {
                        Some(timer) => timer.sleep.as_mut().await,
                        None => std::future::pending().await,
                    }
                };
                let next_event = async {
                    if events_open {
                        events.recv().await
                    } else {
                        std::future::pending().await
                    }
                };
                tokio::select! {
                    event = next_event => Step::Event(event),
                    command = commands.recv() => Step::Command(command),
                    () = dwell => Step::Dwell,
                }
            };

            match step {
                Step::Event(Some(event)) => {
                    if let Some(request) = self.handle_event(event) {
                        armed = Some(ArmedTimer::new(request));
                    }
                }
                Step::Event(None) => {
                    debug!("event stream ended");
                    events_open = false;
                }
                Step::Command(Some(EngineCommand::Intervene { message })) => {
                    self.handle_intervene(message);
                }
                Step::Command(Some(EngineCommand::Reset)) => {
                    armed = None;
                    self.handle_reset();
                }
                Step::Command(None) => {
                    debug!("all handles dropped; engine stopping");
                    break;
                }
                Step::Dwell => {
                    if let Some(timer) = armed.take() {
                        if let Some(request) = self.handle_timer(timer.epoch, timer.kind) {
                            armed = Some(ArmedTimer::new(request));
                        }
                    }
                }
            }

            self.publish_view().await;
        }
    }

    /// Route one decoded event to its owning component.
    fn handle_event(&mut self, event: ServerEvent) -> Option<TimerRequest> {
        match self.ingest.route(event)? {
            RoutedEvent::Snapshot(snapshot) => {
                self.notify(RevealNotice::SnapshotReplaced {
                    topic: snapshot.topic.clone(),
                    round_number: snapshot.round_number,
                });
                self.reconciler.apply(*snapshot);
                None
            }
            RoutedEvent::Turn { turn, round_number } => {
                let advance = self.scheduler.enqueue_turn(turn, round_number, &mut self.live);
                self.apply_advance(advance)
            }
            RoutedEvent::Round(pending) => {
                let advance = self.scheduler.finalize_round(pending, &mut self.live);
                self.apply_advance(advance)
            }
        }
    }

    /// Handle a dwell expiry, quoting the armed timer's generation token.
    fn handle_timer(&mut self, epoch: Epoch, kind: DwellKind) -> Option<TimerRequest> {
        let advance = self.scheduler.timer_fired(epoch, &mut self.live)?;
        debug!(kind = ?kind, "dwell expired");
        self.apply_advance(advance)
    }

    /// Publish what a scheduler step did and return its timer request.
    fn apply_advance(&mut self, advance: Advance) -> Option<TimerRequest> {
        if let Some(done) = advance.completed {
            let PendingRound { round, snapshot } = done;
            self.reconciler.apply(*snapshot);
            self.notify(RevealNotice::RoundFinalized {
                round_number: round.round_number,
                reactions: round.reactions.clone(),
                emergent_pattern: round.emergent_pattern.clone(),
            });
            info!(round_number = round.round_number, "round folded into history");
            self.history.push(RoundRecord::from(round));
        }
        if let Some(revealed) = advance.revealed {
            self.notify(RevealNotice::TurnRevealed {
                turn: revealed.turn,
                round_number: revealed.round_number,
            });
        }
        advance.timer
    }

    /// Merge a local human turn into the live view immediately.
    fn handle_intervene(&mut self, message: String) {
        let turn = PublicTurn {
            speaker_id: HUMAN_SPEAKER_ID.to_owned(),
            message,
            visual: None,
        };
        self.live.push_local(turn.clone());
        info!("human intervention merged into live view");
        self.notify(RevealNotice::InterventionMerged { turn });
    }

    /// Logical restart.
    fn handle_reset(&mut self) {
        self.scheduler.reset();
        self.live.clear();
        self.history.clear();
        info!("engine reset");
        self.notify(RevealNotice::EngineReset);
    }

    fn notify(&self, notice: RevealNotice) {
        // send fails only when no observer is subscribed, which is fine.
        let _ = self.shared.notices.send(notice);
    }

    async fn publish_view(&self) {
        let view = ViewModel {
            snapshot: self.reconciler.current().clone(),
            history: self.history.clone(),
            live: self.live.turns().to_vec(),
        };
        *self.shared.view.write().await = view;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn intervention_is_visible_at_submission_time() {
        let (_event_tx, event_rx) = mpsc::channel(8);
        let (handle, task) = spawn_sync_engine(event_rx, RevealTiming::default());
        let mut notices = handle.subscribe();

        handle.intervene("What does the data actually say?").unwrap();

        match notices.recv().await.unwrap() {
            RevealNotice::InterventionMerged { turn } => {
                assert_eq!(turn.speaker_id, HUMAN_SPEAKER_ID);
            }
            other => panic!("unexpected notice: {other:?}"),
        }
        let view = handle.view().await;
        assert_eq!(view.live.len(), 1);

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_the_view() {
        let (_event_tx, event_rx) = mpsc::channel(8);
        let (handle, task) = spawn_sync_engine(event_rx, RevealTiming::default());
        let mut notices = handle.subscribe();

        handle.intervene("A question.").unwrap();
        handle.reset().unwrap();

        // Drain notices until the reset shows up.
        loop {
            if matches!(notices.recv().await.unwrap(), RevealNotice::EngineReset) {
                break;
            }
        }
        let view = handle.view().await;
        assert!(view.live.is_empty());
        assert!(view.history.is_empty());

        drop(handle);
        task.await.unwrap();
    }
}
