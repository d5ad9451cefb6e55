//! WebSocket transport for the realtime channel.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Extension, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shopfront_events::EventBus;

use super::{ClientEvent, ErrorPayload, ServerEvent};
use crate::app::services::AppServices;

const PING_INTERVAL: Duration = Duration::from_secs(30);

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(services): Extension<Arc<AppServices>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, services))
}

async fn handle_socket(socket: WebSocket, services: Arc<AppServices>) {
    let connection_id = Uuid::now_v7();
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    // Subscribe before reading anything so the client sees the broadcast for
    // its own first event.
    let mut updates = services.realtime().subscribe();
    info!(%connection_id, "realtime client connected");

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_tx.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut ping = interval(PING_INTERVAL);
    ping.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            msg = ws_rx.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    handle_frame(&services, &tx, connection_id, text.as_bytes()).await;
                }
                Some(Ok(Message::Binary(data))) => {
                    handle_frame(&services, &tx, connection_id, &data).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(%connection_id, error = %e, "websocket error");
                    break;
                }
            },

            update = updates.recv() => match update {
                Some(event) => {
                    if !send_event(&tx, &event) {
                        break;
                    }
                }
                None => break,
            },

            _ = ping.tick() => {
                if tx.send(Message::Ping(Vec::new())).is_err() {
                    break;
                }
            }
        }
    }

    send_task.abort();
    info!(%connection_id, "realtime client disconnected");
}

async fn handle_frame(
    services: &AppServices,
    tx: &mpsc::UnboundedSender<Message>,
    connection_id: Uuid,
    frame: &[u8],
) {
    match serde_json::from_slice::<ClientEvent>(frame) {
        Ok(event) => {
            debug!(%connection_id, ?event, "realtime event");
            services.gateway().handle(event).await;
        }
        Err(e) => {
            warn!(%connection_id, error = %e, "undecodable realtime frame");
            let reply = ServerEvent::Error(ErrorPayload {
                message: format!("invalid realtime event: {e}"),
            });
            send_event(tx, &reply);
        }
    }
}

/// Queue `event` for the socket. Returns `false` once the writer is gone.
fn send_event(tx: &mpsc::UnboundedSender<Message>, event: &ServerEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(text) => tx.send(Message::Text(text)).is_ok(),
        Err(e) => {
            warn!(error = %e, "failed to encode realtime event");
            true
        }
    }
}
