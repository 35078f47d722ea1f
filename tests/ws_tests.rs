//! End-to-end WebSocket tests against a bound server.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;

use jobpulse::api::{create_router, AppState};
use jobpulse::ws::{Hub, Notification};

const IDENTITY_HEADER: &str = "x-authenticated-user";

/// Bind a server on an ephemeral port and return its address plus the hub.
async fn spawn_server() -> (String, Hub) {
    let hub = Hub::new();
    let app = create_router(AppState::with_hub(hub.clone()), &[]);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr.to_string(), hub)
}

/// Connect a WebSocket client with the given identity attached.
async fn connect(
    addr: &str,
    user_id: &str,
) -> tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>> {
    let mut request = format!("ws://{addr}/api/ws").into_client_request().unwrap();
    request
        .headers_mut()
        .insert(IDENTITY_HEADER, user_id.parse().unwrap());
    let (socket, _) = connect_async(request).await.unwrap();
    socket
}

/// Poll hub stats until the expected number of connections is registered.
async fn wait_for_clients(hub: &Hub, expected: usize) {
    timeout(Duration::from_secs(5), async {
        while hub.connection_count().await != expected {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("hub never reached expected connection count");
}

/// Read the next text frame as JSON, skipping protocol pings.
async fn next_json<S>(socket: &mut S) -> Value
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    timeout(Duration::from_secs(5), async {
        loop {
            match socket.next().await.expect("socket closed").unwrap() {
                Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
                Message::Ping(_) | Message::Pong(_) => continue,
                other => panic!("unexpected frame: {other:?}"),
            }
        }
    })
    .await
    .expect("timed out waiting for frame")
}

#[tokio::test]
async fn test_upgrade_without_identity_is_rejected() {
    let (addr, _hub) = spawn_server().await;
    let request = format!("ws://{addr}/api/ws").into_client_request().unwrap();
    assert!(connect_async(request).await.is_err());
}

#[tokio::test]
async fn test_targeted_send_reaches_connected_client() {
    let (addr, hub) = spawn_server().await;
    let mut socket = connect(&addr, "u1").await;
    wait_for_clients(&hub, 1).await;

    hub.send_to_user(
        "u1",
        Notification::new("chat", "New message", "hello there"),
    );

    let frame = next_json(&mut socket).await;
    assert_eq!(frame["type"], "chat");
    assert_eq!(frame["content"], "hello there");
    assert_eq!(frame["target"], "u1");
    assert!(frame["created_at"].is_string());
}

#[tokio::test]
async fn test_broadcast_reaches_all_clients_across_users() {
    let (addr, hub) = spawn_server().await;
    let mut s1 = connect(&addr, "u1").await;
    let mut s2 = connect(&addr, "u1").await;
    let mut s3 = connect(&addr, "u2").await;
    wait_for_clients(&hub, 3).await;
    assert_eq!(hub.user_count().await, 2);

    hub.broadcast_to_all(Notification::new("system", "maintenance", "soon"));

    for socket in [&mut s1, &mut s2, &mut s3] {
        let frame = next_json(socket).await;
        assert_eq!(frame["type"], "system");
        assert_eq!(frame["title"], "maintenance");
    }
}

#[tokio::test]
async fn test_client_disconnect_unregisters_connection() {
    let (addr, hub) = spawn_server().await;
    let mut socket = connect(&addr, "u1").await;
    wait_for_clients(&hub, 1).await;

    socket.close(None).await.unwrap();
    wait_for_clients(&hub, 0).await;
    assert_eq!(hub.user_count().await, 0);
}

#[tokio::test]
async fn test_inbound_control_frames_do_not_kill_connection() {
    let (addr, hub) = spawn_server().await;
    let mut socket = connect(&addr, "u1").await;
    wait_for_clients(&hub, 1).await;

    // Known control frame, then garbage: both must be non-fatal.
    socket
        .send(Message::Text(
            r#"{"type":"mark_read","notification_id":"n-1"}"#.into(),
        ))
        .await
        .unwrap();
    socket
        .send(Message::Text("not json at all".into()))
        .await
        .unwrap();

    hub.send_to_user("u1", Notification::new("chat", "still here", "yes"));
    let frame = next_json(&mut socket).await;
    assert_eq!(frame["title"], "still here");
    assert_eq!(hub.connection_count().await, 1);
}

#[tokio::test]
async fn test_reconnect_is_a_fresh_connection() {
    let (addr, hub) = spawn_server().await;
    let mut socket = connect(&addr, "u1").await;
    wait_for_clients(&hub, 1).await;

    // Queued-but-undelivered payloads are lost on disconnect; nothing is
    // replayed to the new connection.
    socket.close(None).await.unwrap();
    wait_for_clients(&hub, 0).await;
    hub.send_to_user("u1", Notification::new("chat", "lost", "gone"));

    let mut socket = connect(&addr, "u1").await;
    wait_for_clients(&hub, 1).await;
    hub.send_to_user("u1", Notification::new("chat", "fresh", "new"));

    let frame = next_json(&mut socket).await;
    assert_eq!(frame["title"], "fresh");
}
