//! WebSocket upgrade handler and per-connection drain loops.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::api::state::AppState;
use crate::auth::CurrentUser;

use super::connection::Connection;
use super::hub::Hub;
use super::types::{ClientFrame, Notification};

/// Keepalive ping interval.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// WebSocket upgrade handler.
///
/// GET /api/ws
///
/// The identity is attached by the upstream auth layer; by the time the
/// upgrade reaches the hub it is trusted as-is.
pub async fn ws_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    ws: WebSocketUpgrade,
) -> Response {
    let user_id = user.into_id();
    info!("websocket upgrade request from user {user_id}");
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub, user_id))
}

/// Run one connection: register with the hub, then drain both directions
/// until either side fails. Exactly one task touches the write half and
/// exactly one loop touches the read half.
async fn handle_socket(socket: WebSocket, hub: Hub, user_id: String) {
    let (sink, stream) = socket.split();

    let (conn, outbound_rx) = Connection::open(&user_id);
    let conn_id = conn.id();
    hub.register(conn);

    // Outbound drain: pops queued notifications in FIFO order and writes
    // them to the wire. A write failure terminates the connection from this
    // side; unregister is idempotent so racing the read path is fine.
    let write_hub = hub.clone();
    let write_user = user_id.clone();
    let send_task = tokio::spawn(async move {
        outbound_drain(sink, outbound_rx).await;
        write_hub.unregister(&write_user, conn_id);
    });

    // Inbound drain: read until error, EOF, or close.
    inbound_drain(stream, &user_id).await;

    // The peer's side of the transport is already gone on this path, so any
    // still-queued items are undeliverable; aborting the outbound drain
    // instead of letting it flush loses nothing.
    hub.unregister(&user_id, conn_id);
    send_task.abort();
    info!("websocket connection closed for user {user_id}");
}

async fn outbound_drain(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound_rx: mpsc::Receiver<Notification>,
) {
    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip the immediate first tick

    loop {
        tokio::select! {
            queued = outbound_rx.recv() => {
                let Some(notification) = queued else {
                    // Queue closed by unregistration and fully drained.
                    // Close the socket so the inbound drain winds down too.
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                };
                let json = match serde_json::to_string(&notification) {
                    Ok(json) => json,
                    Err(err) => {
                        warn!("failed to serialize notification: {err}");
                        continue;
                    }
                };
                if sink.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
        }
    }
}

async fn inbound_drain(mut stream: SplitStream<WebSocket>, user_id: &str) {
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientFrame>(&text) {
                Ok(frame) => handle_frame(user_id, frame),
                Err(err) => {
                    // Malformed inbound frames are ignored, not fatal.
                    debug!("ignoring unparseable frame from user {user_id}: {err}");
                }
            },
            Ok(Message::Binary(_)) => {
                debug!("ignoring binary frame from user {user_id}");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // Pings are answered by axum; pongs just confirm liveness.
            }
            Ok(Message::Close(_)) => {
                info!("user {user_id} closed websocket");
                break;
            }
            Err(err) => {
                warn!("websocket receive error for user {user_id}: {err}");
                break;
            }
        }
    }
}

/// Inbound control frames are an extension point; none of them currently
/// mutates state.
fn handle_frame(user_id: &str, frame: ClientFrame) {
    match frame {
        ClientFrame::Pong => {}
        ClientFrame::MarkRead { notification_id } => {
            debug!("user {user_id} marked notification {notification_id} as read");
        }
    }
}
