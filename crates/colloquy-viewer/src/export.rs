//! Session log export.
//!
//! On shutdown the viewer can write a Markdown transcript of everything
//! the session saw: the roster, every finalized round with its reactions,
//! and whatever is still live. History is session-scoped by design; the
//! export is the only thing that outlives the process.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use colloquy_sync::ViewModel;

use crate::error::ViewerError;

/// Render the session transcript as Markdown.
pub fn render_session_log(view: &ViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Session log: {}", view.snapshot.topic);
    let _ = writeln!(out);
    let _ = writeln!(out, "Rounds completed: {}", view.snapshot.round_number);

    if !view.snapshot.agents.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Roster");
        let _ = writeln!(out);
        for agent in &view.snapshot.agents {
            let _ = writeln!(out, "- **{}** ({}): {}", agent.name, agent.id, agent.stance);
        }
    }

    for round in &view.history {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Round {}", round.round_number);
        let _ = writeln!(out);
        for turn in &round.turns {
            let _ = writeln!(out, "- **{}**: {}", turn.speaker_id, turn.message);
        }
        if !round.reactions.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Reactions:");
            for reaction in &round.reactions {
                let _ = writeln!(
                    out,
                    "- {} {} {}",
                    reaction.agent_id, reaction.emoji, reaction.micro_comment
                );
            }
        }
        if !round.emergent_pattern.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Emergent pattern: {}", round.emergent_pattern);
        }
    }

    if !view.live.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Still live at export time");
        let _ = writeln!(out);
        for entry in &view.live {
            let _ = writeln!(out, "- **{}**: {}", entry.turn.speaker_id, entry.turn.message);
        }
    }

    out
}

/// Write the session transcript into `directory` with a timestamped name.
///
/// Returns the path of the written file.
pub fn write_session_log(directory: &Path, view: &ViewModel) -> Result<PathBuf, ViewerError> {
    std::fs::create_dir_all(directory)?;
    let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
    let path = directory.join(format!("session-{stamp}.md"));
    std::fs::write(&path, render_session_log(view))?;
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use colloquy_sync::RoundRecord;
    use colloquy_types::{PublicTurn, Reaction, StateSnapshot};

    use super::*;

    fn sample_view() -> ViewModel {
        ViewModel {
            snapshot: StateSnapshot {
                topic: "Rewilding urban parks".to_owned(),
                round_number: 1,
                ..StateSnapshot::default()
            },
            history: vec![RoundRecord {
                round_number: 1,
                turns: vec![PublicTurn {
                    speaker_id: "u_maya_0a1b2c3d4e".to_owned(),
                    message: "Start with the soil survey.".to_owned(),
                    visual: None,
                }],
                reactions: vec![Reaction {
                    agent_id: "u_theo_9f8e7d6c5b".to_owned(),
                    emoji: "🌱".to_owned(),
                    micro_comment: "Small step, then iterate.".to_owned(),
                }],
                emergent_pattern: "Evidence-first framing.".to_owned(),
                metrics: serde_json::Value::Null,
            }],
            live: Vec::new(),
        }
    }

    #[test]
    fn log_contains_rounds_and_reactions() {
        let rendered = render_session_log(&sample_view());
        assert!(rendered.contains("# Session log: Rewilding urban parks"));
        assert!(rendered.contains("## Round 1"));
        assert!(rendered.contains("Start with the soil survey."));
        assert!(rendered.contains("Small step, then iterate."));
        assert!(rendered.contains("Emergent pattern: Evidence-first framing."));
    }

    #[test]
    fn log_is_written_to_a_timestamped_file() {
        let dir = std::env::temp_dir().join("colloquy-export-test");
        let path = write_session_log(&dir, &sample_view()).unwrap();
        assert!(path.exists());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("## Round 1"));
        let _ = std::fs::remove_file(path);
    }
}
