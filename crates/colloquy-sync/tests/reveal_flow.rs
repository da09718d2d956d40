//! End-to-end tests of the reveal engine under a paused tokio clock.
//!
//! Events are fed through the same channel the transport uses, and every
//! timing assertion is exact: with `start_paused` the runtime advances the
//! clock only to timer deadlines, so dwell arithmetic has no slack.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::time::Duration;

use colloquy_sync::{RevealNotice, RevealTiming, spawn_sync_engine};
use colloquy_types::{
    HUMAN_SPEAKER_ID, PublicTurn, Reaction, RoundResult, ServerEvent, StateSnapshot,
};
use tokio::sync::mpsc;
use tokio::time::Instant;

const TURN_DWELL: Duration = Duration::from_millis(1000);
const ROUND_GAP: Duration = Duration::from_millis(500);

fn timing() -> RevealTiming {
    RevealTiming {
        turn_dwell: TURN_DWELL,
        round_gap: ROUND_GAP,
    }
}

fn turn(speaker: &str, message: &str) -> PublicTurn {
    PublicTurn {
        speaker_id: speaker.to_owned(),
        message: message.to_owned(),
        visual: None,
    }
}

fn turn_event(speaker: &str, message: &str, round_number: u64) -> ServerEvent {
    ServerEvent::Turn {
        turn: turn(speaker, message),
        round_number,
    }
}

fn round_event(round_number: u64, turns: Vec<PublicTurn>, reactions: Vec<Reaction>) -> ServerEvent {
    ServerEvent::Round {
        round_result: RoundResult {
            round_number,
            speaker_ids: turns.iter().map(|t| t.speaker_id.clone()).collect(),
            turns,
            reactions,
            emergent_pattern: "Constructive disagreement.".to_owned(),
            metrics: serde_json::json!({"novelty": 0.5}),
        },
        metrics: serde_json::json!({"novelty": 0.5}),
        state_snapshot: Box::new(StateSnapshot {
            topic: "Test topic".to_owned(),
            round_number,
            ..StateSnapshot::default()
        }),
    }
}

fn reaction(agent: &str) -> Reaction {
    Reaction {
        agent_id: agent.to_owned(),
        emoji: "🤔".to_owned(),
        micro_comment: "Interesting tension, stay curious.".to_owned(),
    }
}

/// Three turns dwell one at a time, the round finalizes only after the
/// last turn's gap, and the attached snapshot lands at drain completion
/// rather than event arrival.
#[tokio::test(start_paused = true)]
async fn turns_pace_and_round_finalizes_after_drain() {
    let (event_tx, event_rx) = mpsc::channel(32);
    let (handle, task) = spawn_sync_engine(event_rx, timing());
    let mut notices = handle.subscribe();
    let started = Instant::now();

    for (speaker, message) in [("a", "A"), ("b", "B"), ("c", "C")] {
        event_tx.send(turn_event(speaker, message, 5)).await.unwrap();
    }
    event_tx
        .send(round_event(
            5,
            vec![turn("a", "A"), turn("b", "B"), turn("c", "C")],
            vec![reaction("d")],
        ))
        .await
        .unwrap();

    // A reveals immediately.
    match notices.recv().await.unwrap() {
        RevealNotice::TurnRevealed { turn, .. } => assert_eq!(turn.message, "A"),
        other => panic!("unexpected notice: {other:?}"),
    }
    assert_eq!(started.elapsed(), Duration::ZERO);

    // B after one turn dwell.
    match notices.recv().await.unwrap() {
        RevealNotice::TurnRevealed { turn, .. } => assert_eq!(turn.message, "B"),
        other => panic!("unexpected notice: {other:?}"),
    }
    assert_eq!(started.elapsed(), TURN_DWELL);

    // C after another; the round is already pending, so C dwells for the gap.
    match notices.recv().await.unwrap() {
        RevealNotice::TurnRevealed { turn, .. } => assert_eq!(turn.message, "C"),
        other => panic!("unexpected notice: {other:?}"),
    }
    assert_eq!(started.elapsed(), TURN_DWELL.checked_mul(2).unwrap());

    // Reactions were not visible while C was dwelling.
    assert_eq!(handle.view().await.visible_reactions(), 0);
    assert_eq!(handle.view().await.snapshot.round_number, 0);

    match notices.recv().await.unwrap() {
        RevealNotice::RoundFinalized {
            round_number,
            reactions,
            ..
        } => {
            assert_eq!(round_number, 5);
            assert_eq!(reactions.len(), 1);
        }
        other => panic!("unexpected notice: {other:?}"),
    }
    assert_eq!(
        started.elapsed(),
        TURN_DWELL.checked_mul(2).unwrap().checked_add(ROUND_GAP).unwrap()
    );

    let view = handle.view().await;
    // Live collapsed (no human turns were injected), history holds the round,
    // and the deferred snapshot has now been applied.
    assert!(view.live.is_empty());
    assert_eq!(view.history.len(), 1);
    assert_eq!(view.visible_reactions(), 1);
    assert_eq!(view.snapshot.round_number, 5);

    let drained: Vec<String> = view
        .history
        .first()
        .unwrap()
        .turns
        .iter()
        .map(|t| t.message.clone())
        .collect();
    assert_eq!(drained, vec!["A", "B", "C"]);

    drop(handle);
    task.await.unwrap();
}

/// Reset mid-reveal: the in-flight dwell timer is invalidated, no further
/// reveal or finalization happens, and the view is empty.
#[tokio::test(start_paused = true)]
async fn reset_mid_reveal_stops_all_transitions() {
    let (event_tx, event_rx) = mpsc::channel(32);
    let (handle, task) = spawn_sync_engine(event_rx, timing());
    let mut notices = handle.subscribe();

    for (speaker, message) in [("a", "A"), ("b", "B"), ("c", "C")] {
        event_tx.send(turn_event(speaker, message, 5)).await.unwrap();
    }
    event_tx
        .send(round_event(
            5,
            vec![turn("a", "A"), turn("b", "B"), turn("c", "C")],
            Vec::new(),
        ))
        .await
        .unwrap();

    // Let A and B reveal, then reset in the middle of B's dwell.
    let _ = notices.recv().await.unwrap();
    let _ = notices.recv().await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.reset().unwrap();

    loop {
        if matches!(notices.recv().await.unwrap(), RevealNotice::EngineReset) {
            break;
        }
    }

    // Give the invalidated timers every chance to misfire.
    let quiet = tokio::time::timeout(Duration::from_secs(10), notices.recv()).await;
    assert!(quiet.is_err(), "no transition may follow a reset: {quiet:?}");

    let view = handle.view().await;
    assert!(view.live.is_empty());
    assert!(view.history.is_empty());

    drop(handle);
    task.await.unwrap();
}

/// A transport echo of a locally submitted human turn produces no
/// duplicate visible entry.
#[tokio::test(start_paused = true)]
async fn echoed_human_turn_is_suppressed() {
    let (event_tx, event_rx) = mpsc::channel(32);
    let (handle, task) = spawn_sync_engine(event_rx, timing());
    let mut notices = handle.subscribe();

    handle.intervene("Could we quantify that?").unwrap();
    match notices.recv().await.unwrap() {
        RevealNotice::InterventionMerged { .. } => {}
        other => panic!("unexpected notice: {other:?}"),
    }

    // The echo arrives through the transport, then a normal agent turn.
    event_tx
        .send(turn_event(HUMAN_SPEAKER_ID, "Could we quantify that?", 6))
        .await
        .unwrap();
    event_tx.send(turn_event("a", "Gladly.", 6)).await.unwrap();

    match notices.recv().await.unwrap() {
        RevealNotice::TurnRevealed { turn, .. } => assert_eq!(turn.message, "Gladly."),
        other => panic!("echo must not surface: {other:?}"),
    }

    let view = handle.view().await;
    assert_eq!(view.live.len(), 2);
    assert_eq!(
        view.live.first().unwrap().turn.speaker_id,
        HUMAN_SPEAKER_ID
    );

    drop(handle);
    task.await.unwrap();
}

/// Locally injected human turns survive the round-drain collapse.
#[tokio::test(start_paused = true)]
async fn human_turns_persist_across_round_boundaries() {
    let (event_tx, event_rx) = mpsc::channel(32);
    let (handle, task) = spawn_sync_engine(event_rx, timing());
    let mut notices = handle.subscribe();

    handle.intervene("Before the round.").unwrap();
    event_tx.send(turn_event("a", "Reply.", 1)).await.unwrap();
    event_tx
        .send(round_event(1, vec![turn("a", "Reply.")], vec![reaction("b")]))
        .await
        .unwrap();

    loop {
        if matches!(notices.recv().await.unwrap(), RevealNotice::RoundFinalized { .. }) {
            break;
        }
    }

    let view = handle.view().await;
    assert_eq!(view.live.len(), 1);
    assert_eq!(view.live.first().unwrap().turn.message, "Before the round.");
    assert_eq!(view.visible_reactions(), 1);

    drop(handle);
    task.await.unwrap();
}

/// A `state` event replaces the snapshot immediately, with no timers
/// involved; a round-attached snapshot waits for the drain.
#[tokio::test(start_paused = true)]
async fn state_snapshot_applies_immediately() {
    let (event_tx, event_rx) = mpsc::channel(32);
    let (handle, task) = spawn_sync_engine(event_rx, timing());
    let mut notices = handle.subscribe();

    event_tx
        .send(ServerEvent::State {
            state_snapshot: Box::new(StateSnapshot {
                topic: "Fresh topic".to_owned(),
                round_number: 2,
                ..StateSnapshot::default()
            }),
        })
        .await
        .unwrap();

    match notices.recv().await.unwrap() {
        RevealNotice::SnapshotReplaced { topic, round_number } => {
            assert_eq!(topic, "Fresh topic");
            assert_eq!(round_number, 2);
        }
        other => panic!("unexpected notice: {other:?}"),
    }
    assert_eq!(handle.view().await.snapshot.topic, "Fresh topic");

    drop(handle);
    task.await.unwrap();
}
