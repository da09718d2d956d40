//! Viewer configuration.
//!
//! Settings are layered: built-in defaults, then an optional
//! `colloquy.yaml` next to the working directory, then `COLLOQUY_*`
//! environment variables (`COLLOQUY_SERVER__BASE_URL` and friends, with
//! `__` separating sections).

use std::time::Duration;

use colloquy_sync::RevealTiming;
use colloquy_transport::BackoffPolicy;
use serde::Deserialize;

use crate::error::ViewerError;

/// Complete viewer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewerConfig {
    /// Simulation server connection settings.
    pub server: ServerSection,
    /// Reveal pacing settings.
    pub reveal: RevealSection,
    /// Reconnect backoff settings.
    pub backoff: BackoffSection,
    /// Session log export settings.
    pub export: ExportSection,
}

/// Where the simulation server lives and how to talk to it.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// HTTP(S) base address; the socket endpoint is derived from it.
    pub base_url: String,
    /// Optional admin credential for the command layer. The event socket
    /// never carries it.
    #[serde(default)]
    pub admin_token: Option<String>,
}

/// Dwell durations, one per phase.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RevealSection {
    /// Per-turn reveal dwell in milliseconds.
    pub turn_dwell_ms: u64,
    /// Post-round gap in milliseconds.
    pub round_gap_ms: u64,
}

/// Reconnect backoff parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BackoffSection {
    /// Delay before the first reconnect attempt, in milliseconds.
    pub initial_ms: u64,
    /// Growth factor applied after each failed attempt.
    pub multiplier: f64,
    /// Delay cap in milliseconds.
    pub max_ms: u64,
}

/// Session log export behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportSection {
    /// Directory session logs are written into.
    pub directory: String,
    /// Whether to write a session log on shutdown.
    pub write_on_exit: bool,
}

impl ViewerConfig {
    /// Load configuration from defaults, the optional config file, and the
    /// environment.
    pub fn load(file_name: &str) -> Result<Self, ViewerError> {
        let settings = config::Config::builder()
            .set_default("server.base_url", "http://127.0.0.1:8000")?
            .set_default("reveal.turn_dwell_ms", 2400_i64)?
            .set_default("reveal.round_gap_ms", 1200_i64)?
            .set_default("backoff.initial_ms", 1000_i64)?
            .set_default("backoff.multiplier", 1.5_f64)?
            .set_default("backoff.max_ms", 10_000_i64)?
            .set_default("export.directory", "logs")?
            .set_default("export.write_on_exit", true)?
            .add_source(config::File::with_name(file_name).required(false))
            .add_source(config::Environment::with_prefix("COLLOQUY").separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// The reveal timing policy.
    pub const fn reveal_timing(&self) -> RevealTiming {
        RevealTiming {
            turn_dwell: Duration::from_millis(self.reveal.turn_dwell_ms),
            round_gap: Duration::from_millis(self.reveal.round_gap_ms),
        }
    }

    /// The reconnect backoff policy.
    pub const fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            initial: Duration::from_millis(self.backoff.initial_ms),
            multiplier: self.backoff.multiplier,
            max: Duration::from_millis(self.backoff.max_ms),
        }
    }
}
