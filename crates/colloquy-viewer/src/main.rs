//! Colloquy viewer binary.
//!
//! Wires the transport client into the reveal engine and follows the
//! conversation as structured log lines until interrupted. On shutdown it
//! tears the transport down cleanly and, when configured, exports a
//! Markdown session log.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration (defaults, `colloquy.yaml`, `COLLOQUY_*` env)
//! 3. Fetch the initial snapshot over the command layer (best effort)
//! 4. Spawn the transport client against the derived socket endpoint
//! 5. Spawn the reveal engine on the decoded event stream
//! 6. Follow status changes and reveal notices until Ctrl-C
//! 7. Tear down the transport, export the session log, stop the engine

mod config;
mod error;
mod export;
mod render;
mod restart;

use std::path::Path;

use colloquy_api::ApiClient;
use colloquy_sync::{RevealNotice, spawn_sync_engine};
use colloquy_transport::{TransportConfig, WsConnector, spawn_transport};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ViewerConfig;
use crate::restart::RestartDetector;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("colloquy-viewer starting");

    // 2. Load configuration.
    let config = ViewerConfig::load("colloquy")?;
    info!(
        base_url = %config.server.base_url,
        turn_dwell_ms = config.reveal.turn_dwell_ms,
        round_gap_ms = config.reveal.round_gap_ms,
        "Configuration loaded"
    );

    // 3. Fetch the initial snapshot over the command layer. The socket
    //    will deliver one anyway; this just makes a cold start visible.
    let mut api = ApiClient::new(&config.server.base_url)?;
    if let Some(token) = &config.server.admin_token {
        api = api.with_admin_token(token.clone());
    }
    match api.state().await {
        Ok(snapshot) => info!(
            topic = %snapshot.topic,
            round_number = snapshot.round_number,
            agents = snapshot.agents.len(),
            "Initial snapshot fetched"
        ),
        Err(error) => warn!(error = %error, "Initial snapshot fetch failed; relying on the stream"),
    }

    // 4. Spawn the transport client.
    let connector = WsConnector::from_base(&config.server.base_url)?;
    info!(endpoint = %connector.endpoint(), "Transport endpoint derived");
    let transport_config = TransportConfig {
        backoff: config.backoff_policy(),
        ..TransportConfig::default()
    };
    let (transport, events) = spawn_transport(connector, transport_config);

    // 5. Spawn the reveal engine.
    let (sync, engine_task) = spawn_sync_engine(events, config.reveal_timing());
    info!("Reveal engine started");

    // 6. Follow the stream.
    let mut notices = sync.subscribe();
    let mut status = transport.status_stream();
    let mut detector = RestartDetector::new();

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(error) = signal {
                    warn!(error = %error, "Ctrl-C handler failed; shutting down");
                }
                info!("shutdown requested");
                break;
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                render::log_status(*status.borrow_and_update());
            }
            notice = notices.recv() => match notice {
                Ok(notice) => {
                    render::log_notice(&notice);
                    if let RevealNotice::SnapshotReplaced { topic, round_number } = &notice {
                        if detector.observe(topic, *round_number) {
                            info!("logical restart detected; resetting the view");
                            let _ = sync.reset();
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "notice stream lagged; skipping ahead");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    // 7. Tear down.
    transport.shutdown().await;
    if config.export.write_on_exit {
        let view = sync.view().await;
        match export::write_session_log(Path::new(&config.export.directory), &view) {
            Ok(path) => info!(path = %path.display(), "Session log written"),
            Err(error) => warn!(error = %error, "Session log export failed"),
        }
    }
    drop(sync);
    let _ = engine_task.await;
    info!("colloquy-viewer stopped");
    Ok(())
}
