//! Notice rendering.
//!
//! Chart, table, and avatar rendering are someone else's job; the viewer
//! presents the conversation as structured log lines, one per reveal
//! notice, so the stream reads naturally in a terminal or a log collector.

use colloquy_sync::RevealNotice;
use colloquy_transport::ConnectionStatus;
use tracing::info;

/// Longest message excerpt shown in a log line.
const PREVIEW_CHARS: usize = 96;

/// Log one reveal notice.
pub fn log_notice(notice: &RevealNotice) {
    match notice {
        RevealNotice::TurnRevealed { turn, round_number } => {
            info!(
                round_number = round_number,
                speaker = %turn.speaker_id,
                has_visual = turn.visual.is_some(),
                message = %preview(&turn.message),
                "turn revealed"
            );
        }
        RevealNotice::InterventionMerged { turn } => {
            info!(message = %preview(&turn.message), "intervention shown");
        }
        RevealNotice::RoundFinalized {
            round_number,
            reactions,
            emergent_pattern,
        } => {
            info!(
                round_number = round_number,
                reactions = reactions.len(),
                pattern = %preview(emergent_pattern),
                "round finalized"
            );
        }
        RevealNotice::SnapshotReplaced { topic, round_number } => {
            info!(topic = %topic, round_number = round_number, "snapshot replaced");
        }
        RevealNotice::EngineReset => {
            info!("view reset");
        }
    }
}

/// Log a connection status transition.
pub fn log_status(status: ConnectionStatus) {
    info!(status = %status, "connection status changed");
}

/// First line of a message, truncated on a character boundary.
fn preview(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or_default();
    let mut out: String = first_line.chars().take(PREVIEW_CHARS).collect();
    if first_line.chars().count() > PREVIEW_CHARS {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_keeps_short_messages_intact() {
        assert_eq!(preview("A short point."), "A short point.");
    }

    #[test]
    fn preview_takes_only_the_first_line() {
        assert_eq!(preview("First line.\nSecond line."), "First line.");
    }

    #[test]
    fn preview_truncates_long_messages() {
        let long = "x".repeat(200);
        let shown = preview(&long);
        assert_eq!(shown.chars().count(), PREVIEW_CHARS.saturating_add(1));
        assert!(shown.ends_with('…'));
    }
}
