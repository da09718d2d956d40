//! Loopback integration test for the production `WebSocket` connector.
//!
//! Spins up a real axum `WebSocket` server on an ephemeral port, points the
//! transport client at its HTTP base address, and checks that decoded
//! events come out the other end while garbage frames vanish silently.

#![allow(clippy::unwrap_used, clippy::panic)]

use axum::Router;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use colloquy_transport::{TransportConfig, WsConnector, spawn_transport};
use colloquy_types::ServerEvent;

async fn ws_feed(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(feed)
}

/// Send one snapshot, one garbage frame, and one turn, then close.
async fn feed(mut socket: WebSocket) {
    let snapshot = serde_json::json!({
        "type": "state",
        "state_snapshot": {"topic": "Loopback topic"}
    });
    let turn = serde_json::json!({
        "type": "turn",
        "turn": {"speaker_id": "m_host_0000000000", "message": "Welcome."},
        "round_number": 1
    });

    let frames = [
        snapshot.to_string(),
        "this is not an event".to_owned(),
        turn.to_string(),
    ];
    for frame in frames {
        if socket.send(Message::Text(frame.into())).await.is_err() {
            return;
        }
    }
    let _ = socket.send(Message::Close(None)).await;
}

#[tokio::test]
async fn delivers_decoded_events_over_a_real_socket() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/ws", get(ws_feed));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let connector = WsConnector::from_base(&format!("http://{addr}")).unwrap();
    let (handle, mut events) = spawn_transport(connector, TransportConfig::default());

    match events.recv().await.unwrap() {
        ServerEvent::State { state_snapshot } => {
            assert_eq!(state_snapshot.topic, "Loopback topic");
        }
        other => panic!("expected snapshot first, got {other:?}"),
    }
    match events.recv().await.unwrap() {
        ServerEvent::Turn { turn, round_number } => {
            assert_eq!(turn.message, "Welcome.");
            assert_eq!(round_number, 1);
        }
        other => panic!("expected turn second, got {other:?}"),
    }

    handle.shutdown().await;
}
