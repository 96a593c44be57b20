//! WebSocket session tests
//!
//! These tests serve the routes on an ephemeral port and connect a real
//! client to verify:
//! - Server pings on the configured interval
//! - Idle connections are closed and unregistered
//! - Binary frames are ignored, text frames are routed
//! - Client close unregisters the connection

mod common;

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use common::{router_with, ScriptedGenerator};
use incident_router::agents::EventRouter;
use incident_router::api::{self, AppState};
use incident_router::config::HeartbeatConfig;
use incident_router::domain::incident::{Envelope, SafetyInspection};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve(router: Arc<EventRouter>, heartbeat: HeartbeatConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = api::routes(AppState::new(router, heartbeat));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn open(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
    client
}

/// Poll the registry until it holds `expected` connections
async fn wait_for_connections(router: &EventRouter, expected: usize) {
    timeout(Duration::from_secs(3), async {
        while router.registry().len().await != expected {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("registry never reached {} connections", expected));
}

/// Next text frame as an envelope, skipping control frames
async fn next_envelope(client: &mut Client) -> Envelope {
    loop {
        let message = timeout(Duration::from_secs(3), client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .unwrap();

        match message {
            Message::Text(_) => return Envelope::parse(message.to_text().unwrap()).unwrap(),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame {:?}", other),
        }
    }
}

fn heartbeat(ping_ms: u64, idle_ms: u64) -> HeartbeatConfig {
    HeartbeatConfig {
        ping_interval: Duration::from_millis(ping_ms),
        idle_timeout: Duration::from_millis(idle_ms),
    }
}

#[tokio::test]
async fn test_server_pings_on_interval() {
    let router = router_with(ScriptedGenerator::succeeding());
    let addr = serve(router.clone(), heartbeat(100, 5_000)).await;
    let mut client = open(addr).await;

    let message = timeout(Duration::from_secs(2), client.next())
        .await
        .expect("no ping within two seconds")
        .unwrap()
        .unwrap();

    assert!(matches!(message, Message::Ping(_)), "got {:?}", message);
}

#[tokio::test]
async fn test_idle_connection_is_unregistered() {
    let router = router_with(ScriptedGenerator::succeeding());
    let addr = serve(router.clone(), heartbeat(100, 300)).await;

    // Never read, so pings go unanswered
    let client = open(addr).await;
    wait_for_connections(&router, 1).await;

    wait_for_connections(&router, 0).await;
    drop(client);
}

#[tokio::test]
async fn test_weather_alert_round_trip_over_socket() {
    let generator = ScriptedGenerator::succeeding();
    let router = router_with(generator.clone());
    let addr = serve(router.clone(), HeartbeatConfig::default()).await;
    let mut client = open(addr).await;
    wait_for_connections(&router, 1).await;

    client.send(Message::binary(vec![1, 2, 3])).await.unwrap();
    client
        .send(Message::text(
            r#"{"type":"weather_alert","payload":{"location":"Downtown","alert_type":"storm"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(
        next_envelope(&mut client).await,
        Envelope::SafetyMonitor(SafetyInspection {
            status: "OK".to_string(),
            location: Some("Downtown".to_string()),
        })
    );
    assert!(matches!(
        next_envelope(&mut client).await,
        Envelope::CityReport(_)
    ));
    assert_eq!(generator.calls(), 1);
    assert_eq!(router.registry().len().await, 1);
}

#[tokio::test]
async fn test_client_close_unregisters_connection() {
    let router = router_with(ScriptedGenerator::succeeding());
    let addr = serve(router.clone(), HeartbeatConfig::default()).await;
    let mut client = open(addr).await;
    wait_for_connections(&router, 1).await;

    client.close(None).await.unwrap();

    wait_for_connections(&router, 0).await;
}
