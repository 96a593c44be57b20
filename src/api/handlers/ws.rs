use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::agents::ConnectionId;
use crate::api::state::AppState;
use crate::domain::incident::Envelope;

/// Upgrade to the duplex event channel
///
/// GET /ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Per-connection loop
///
/// Inbound frames are handled one at a time, in arrival order. Outbound
/// envelopes and pings go through a separate writer task so that replies
/// queued during a slow report call are not blocked on the reader.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (ws_tx, mut ws_rx) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    let registry = Arc::clone(state.router.registry());
    let conn_id = registry.register(tx).await;
    info!(conn_id = %conn_id, "WebSocket connection opened");

    let writer = tokio::spawn(write_loop(
        conn_id,
        ws_tx,
        rx,
        state.heartbeat.ping_interval,
    ));

    loop {
        let next = match timeout(state.heartbeat.idle_timeout, ws_rx.next()).await {
            Ok(next) => next,
            Err(_) => {
                info!(conn_id = %conn_id, "Idle timeout, closing");
                break;
            }
        };

        match next {
            Some(Ok(Message::Text(text))) => {
                state.router.handle_text(conn_id, &text).await;
            }
            Some(Ok(Message::Close(_))) | None => break,
            // Pings, pongs and binary frames only count as activity
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }

        // The router unregisters connections it could not write to
        if !registry.contains(conn_id).await {
            break;
        }
    }

    registry.unregister(conn_id).await;
    writer.abort();
    info!(conn_id = %conn_id, "WebSocket connection closed");
}

async fn write_loop(
    conn_id: ConnectionId,
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Envelope>,
    ping_every: Duration,
) {
    let mut ping = interval(ping_every);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ping.tick().await;

    loop {
        tokio::select! {
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let frame = match envelope.to_frame() {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!(conn_id = %conn_id, error = %e, "Failed to encode envelope");
                        continue;
                    }
                };
                if ws_tx.send(Message::Text(frame)).await.is_err() {
                    debug!(conn_id = %conn_id, "Writer stopped, peer gone");
                    break;
                }
            }
            _ = ping.tick() => {
                if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    let _ = ws_tx.close().await;
}
