//! Long-poll fallback tests against a mock HTTP server.

use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;
use vitrine_realtime::{Frame, RealtimeClient, RealtimeConfig, ReconnectPolicy};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(5);

/// WebSocket endpoint with nothing listening, so the client falls back.
fn fallback_config(poll_base: String) -> RealtimeConfig {
    RealtimeConfig {
        url: "ws://127.0.0.1:1/rt".to_string(),
        poll_url: poll_base,
        prefer_websocket: true,
        reconnect: ReconnectPolicy {
            max_attempts: 20,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
        },
    }
}

async fn mount_poll_sequence(server: &MockServer, frames: serde_json::Value) {
    // First poll (cursor 0) returns the batch, later polls hang briefly and
    // come back empty, like a real long-poll window timing out.
    Mock::given(method("GET"))
        .and(path("/rt/poll"))
        .and(query_param("cursor", "0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"cursor": 1, "frames": frames})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rt/poll"))
        .and(query_param("cursor", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_json(json!({"cursor": 1, "frames": []})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn falls_back_to_long_poll_and_dispatches() {
    let server = MockServer::start().await;
    let update = Frame::new(
        "update",
        json!({"topic": "product_updated", "payload": {"id": 9, "title": "Candle"}}),
    );
    mount_poll_sequence(&server, json!([update])).await;

    let client = RealtimeClient::new(fallback_config(format!("{}/rt", server.uri())));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _sub = client.subscribe("product_updated", move |payload| {
        let _ = tx.send(payload.clone());
    });
    client.connect();

    let payload = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(payload["id"], 9);
    assert_eq!(payload["title"], "Candle");
    assert!(client.is_connected());

    client.disconnect();
}

#[tokio::test]
async fn emit_posts_frames_over_long_poll() {
    let server = MockServer::start().await;
    mount_poll_sequence(&server, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/rt/emit"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = RealtimeClient::new(fallback_config(format!("{}/rt", server.uri())));
    client.connect();

    let mut connected = client.watch_connected();
    let _ = timeout(WAIT, connected.wait_for(|c| *c)).await.unwrap().unwrap();

    client.emit("whatsapp:subscribe", json!({"phone": "+33600000000"}));

    // The POST lands asynchronously; wait for it to show up.
    let deadline = tokio::time::Instant::now() + WAIT;
    loop {
        let requests = server.received_requests().await.unwrap_or_default();
        if let Some(request) = requests.iter().find(|r| r.method.to_string() == "POST") {
            let frame: Frame = serde_json::from_slice(&request.body).unwrap();
            assert_eq!(frame.event, "whatsapp:subscribe");
            assert_eq!(frame.data["phone"], "+33600000000");
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "emit never reached the server");
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    client.disconnect();
}

#[tokio::test]
async fn poll_cursor_advances_between_requests() {
    let server = MockServer::start().await;
    let first = Frame::new("update", json!({"topic": "cms-update", "payload": {"slug": "a"}}));
    let second = Frame::new("update", json!({"topic": "cms-update", "payload": {"slug": "b"}}));

    Mock::given(method("GET"))
        .and(path("/rt/poll"))
        .and(query_param("cursor", "0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"cursor": 3, "frames": [first]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rt/poll"))
        .and(query_param("cursor", "3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"cursor": 4, "frames": [second]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rt/poll"))
        .and(query_param("cursor", "4"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_json(json!({"cursor": 4, "frames": []})),
        )
        .mount(&server)
        .await;

    let client = RealtimeClient::new(fallback_config(format!("{}/rt", server.uri())));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _sub = client.subscribe("cms-update", move |payload| {
        let _ = tx.send(payload["slug"].clone());
    });
    client.connect();

    let a = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    let b = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(a, "a");
    assert_eq!(b, "b");

    client.disconnect();
}
