use std::net::SocketAddr;
use std::time::Duration;

use futures_util::StreamExt;
use linebus::{Bus, server};
use reqwest::Client;
use tokio::net::TcpListener;
use tokio::time::timeout;

async fn spawn_server(bus: &Bus) -> SocketAddr {
    bus.listen();
    let router = server::router(bus.handle());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router.into_make_service()).await {
            tracing::error!("server error: {err:?}");
        }
    });

    addr
}

#[tokio::test(flavor = "multi_thread")]
async fn post_publishes_each_non_blank_line_and_echoes() {
    let bus = Bus::new();
    let addr = spawn_server(&bus).await;
    let handle = bus.handle();

    let mut subscriber = handle.subscribe().await.expect("subscribe");

    let client = Client::new();
    let response = client
        .post(format!("http://{addr}/_"))
        .body("a\n\nb\n")
        .send()
        .await
        .expect("post");
    assert!(response.status().is_success());
    let echo = response.text().await.expect("echo body");
    assert_eq!(echo, "ok: a\nok: b\n");

    // Exactly two messages, blank line skipped, order preserved.
    assert_eq!(subscriber.recv().await.expect("a").as_bytes(), b"a");
    assert_eq!(subscriber.recv().await.expect("b").as_bytes(), b"b");
    assert!(
        subscriber
            .next_timeout(Duration::from_millis(100))
            .await
            .is_none()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn streaming_get_relays_broadcasts_as_lines() {
    let bus = Bus::new();
    let addr = spawn_server(&bus).await;
    let handle = bus.handle();

    let client = Client::new();
    let response = client
        .get(format!("http://{addr}/_"))
        .send()
        .await
        .expect("get");

    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("text/event-stream")
    );
    assert_eq!(
        response
            .headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("no-cache")
    );
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );

    // Headers received means the handler ran, so the subscriber is registered.
    handle.publish("hello").expect("publish hello");
    handle.publish("world").expect("publish world");

    let mut body = response.bytes_stream();
    let mut received = String::new();
    while !received.contains("world") {
        let chunk = timeout(Duration::from_secs(2), body.next())
            .await
            .expect("stream chunk in time")
            .expect("stream open")
            .expect("chunk ok");
        received.push_str(&String::from_utf8_lossy(&chunk));
    }
    assert_eq!(received, "hello\nworld\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn client_disconnect_deregisters_subscriber() {
    use linebus::{BusEvent, MemorySink};

    let sink = MemorySink::new();
    let sink_snapshot = sink.clone();
    let bus = Bus::with_sink(sink);
    let addr = spawn_server(&bus).await;

    let client = Client::new();
    let response = client
        .get(format!("http://{addr}/_"))
        .send()
        .await
        .expect("get");
    drop(response);

    // The dropped connection tears down the handler's subscription; the
    // removal shows up once the loop processes it.
    let mut removed = 0;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        removed = sink_snapshot
            .snapshot()
            .iter()
            .filter(|e| matches!(e, BusEvent::SubscriberRemoved { .. }))
            .count();
        if removed == 1 {
            break;
        }
    }
    assert_eq!(removed, 1);

    // The bus keeps serving publishes afterwards.
    bus.handle().publish("still alive").expect("publish");
}

#[tokio::test(flavor = "multi_thread")]
async fn prefixed_subpaths_serve_ingestion_too() {
    let bus = Bus::new();
    let addr = spawn_server(&bus).await;
    let handle = bus.handle();

    let mut subscriber = handle.subscribe().await.expect("subscribe");

    let client = Client::new();
    let response = client
        .post(format!("http://{addr}/_/events"))
        .body("nested\n")
        .send()
        .await
        .expect("post");
    assert!(response.status().is_success());
    assert_eq!(subscriber.recv().await.expect("nested").as_bytes(), b"nested");
}

#[tokio::test(flavor = "multi_thread")]
async fn paths_outside_the_prefix_are_404() {
    let bus = Bus::new();
    let addr = spawn_server(&bus).await;

    let client = Client::new();
    for path in ["/", "/events", "/api/anything"] {
        let response = client
            .get(format!("http://{addr}{path}"))
            .send()
            .await
            .expect("get");
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn ingestion_fails_fast_after_shutdown() {
    let bus = Bus::new();
    let addr = spawn_server(&bus).await;

    bus.shutdown().await;

    let client = Client::new();
    let response = client
        .post(format!("http://{addr}/_"))
        .body("too late\n")
        .send()
        .await
        .expect("post");
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
}
