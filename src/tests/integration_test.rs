use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, Stream, StreamExt};
use serde_json::json;
use tungstenite::protocol::Message as WsMessage;

use crate::broker::Broker;
use crate::config::Settings;
use crate::transport::websocket::start_websocket_server;
use crate::trigger::{TriggerClient, TriggerClientSync};

async fn start_server(port: u16, settings: Settings) -> Arc<Mutex<Broker>> {
    let broker = Arc::new(Mutex::new(Broker::new()));
    let server_broker = broker.clone();
    tokio::spawn(async move {
        let addr = format!("127.0.0.1:{port}");
        start_websocket_server(&addr, server_broker, settings).await;
    });

    // Give the server a moment to start up
    tokio::time::sleep(Duration::from_millis(200)).await;
    broker
}

async fn recv_json<S>(ws: &mut S) -> serde_json::Value
where
    S: Stream<Item = Result<WsMessage, tungstenite::Error>> + Unpin,
{
    let msg = ws
        .next()
        .await
        .expect("stream ended unexpectedly")
        .expect("websocket error");
    serde_json::from_str(msg.to_text().expect("expected a text frame"))
        .expect("expected a JSON envelope")
}

#[tokio::test]
async fn integration_subscribe_and_producer_notification() {
    start_server(9301, Settings::default()).await;

    let (mut subscriber, _) = tokio_tungstenite::connect_async("ws://127.0.0.1:9301/ws/alpha")
        .await
        .expect("subscriber connect");
    let (mut bystander, _) = tokio_tungstenite::connect_async("ws://127.0.0.1:9301/ws/beta")
        .await
        .expect("bystander connect");

    subscriber
        .send(WsMessage::text(
            json!({ "type": "subscribe", "channel": "inventory" }).to_string(),
        ))
        .await
        .unwrap();

    let ack = recv_json(&mut subscriber).await;
    assert_eq!(ack["type"], "subscription");
    assert_eq!(ack["status"], "success");
    assert_eq!(ack["channel"], "inventory");

    let trigger = TriggerClient::new("ws://127.0.0.1:9301/ws/trigger");
    assert!(
        trigger
            .send_notification("Data refreshed", "inventory", "success")
            .await
    );

    let delivered = recv_json(&mut subscriber).await;
    assert_eq!(delivered["type"], "notification");
    assert_eq!(delivered["message"], "Data refreshed");
    assert_eq!(delivered["category"], "success");

    // The unsubscribed session saw nothing from the channel broadcast
    let nothing = tokio::time::timeout(Duration::from_millis(300), bystander.next()).await;
    assert!(nothing.is_err(), "bystander unexpectedly received a message");
}

#[tokio::test]
async fn integration_navigate_round_trip_survives_unknown_kind() {
    start_server(9302, Settings::default()).await;

    let (mut ws, _) = tokio_tungstenite::connect_async("ws://127.0.0.1:9302/ws/nav-client")
        .await
        .expect("client connect");

    // An unrecognized kind is logged and ignored; the connection stays usable
    ws.send(WsMessage::text(
        json!({ "type": "telemetry", "cpu": 0.3 }).to_string(),
    ))
    .await
    .unwrap();

    ws.send(WsMessage::text(
        json!({ "type": "navigate", "page": "Sales Report" }).to_string(),
    ))
    .await
    .unwrap();

    let reply = recv_json(&mut ws).await;
    assert_eq!(reply["type"], "navigation");
    assert_eq!(reply["url"], "/Sales_Report");
    assert!(
        chrono::DateTime::parse_from_rfc3339(reply["timestamp"].as_str().unwrap()).is_ok(),
        "timestamp should be ISO-8601"
    );
}

#[tokio::test]
async fn integration_malformed_payload_closes_only_that_connection() {
    let broker = start_server(9303, Settings::default()).await;

    let (mut bad, _) = tokio_tungstenite::connect_async("ws://127.0.0.1:9303/ws/bad")
        .await
        .expect("client connect");
    let (mut good, _) = tokio_tungstenite::connect_async("ws://127.0.0.1:9303/ws/good")
        .await
        .expect("client connect");

    bad.send(WsMessage::text("not json at all")).await.unwrap();

    match bad.next().await {
        None | Some(Err(_)) | Some(Ok(WsMessage::Close(_))) => {}
        Some(Ok(other)) => panic!("expected the connection to close, got {other:?}"),
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(broker.lock().unwrap().session_count(), 1);

    // The other session is unaffected
    good.send(WsMessage::text(
        json!({ "type": "navigate", "page": "Inventory" }).to_string(),
    ))
    .await
    .unwrap();
    let reply = recv_json(&mut good).await;
    assert_eq!(reply["url"], "/Inventory");
}

#[tokio::test]
async fn integration_capacity_bound_rejects_handshake() {
    let mut settings = Settings::default();
    settings.broker.max_connections = 1;
    start_server(9304, settings).await;

    let (_first, _) = tokio_tungstenite::connect_async("ws://127.0.0.1:9304/ws/one")
        .await
        .expect("first connect");
    tokio::time::sleep(Duration::from_millis(100)).await;

    let second = tokio_tungstenite::connect_async("ws://127.0.0.1:9304/ws/two").await;
    assert!(second.is_err(), "handshake past the capacity bound succeeded");
}

#[tokio::test]
async fn integration_idle_connection_is_reaped() {
    let mut settings = Settings::default();
    settings.broker.idle_timeout_secs = 1;
    let broker = start_server(9305, settings).await;

    let (_ws, _) = tokio_tungstenite::connect_async("ws://127.0.0.1:9305/ws/silent")
        .await
        .expect("client connect");
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(broker.lock().unwrap().session_count(), 1);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(broker.lock().unwrap().session_count(), 0);
}

#[tokio::test]
async fn integration_sync_trigger_refresh_reaches_subscriber() {
    start_server(9306, Settings::default()).await;

    let (mut ws, _) = tokio_tungstenite::connect_async("ws://127.0.0.1:9306/ws/report-view")
        .await
        .expect("client connect");
    ws.send(WsMessage::text(
        json!({ "type": "subscribe", "channel": "sales" }).to_string(),
    ))
    .await
    .unwrap();
    recv_json(&mut ws).await; // ack

    // Synchronous producer code runs on a plain thread
    let delivered = tokio::task::spawn_blocking(|| {
        let trigger = TriggerClientSync::new("ws://127.0.0.1:9306/ws/trigger");
        trigger.trigger_refresh("sales")
    })
    .await
    .unwrap();
    assert!(delivered);

    let envelope = recv_json(&mut ws).await;
    assert_eq!(envelope["type"], "refresh");
    assert_eq!(envelope["channel"], "sales");
}
