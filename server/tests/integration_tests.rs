//! Integration tests for the game-state server
//!
//! These tests drive a real server over real WebSocket connections and
//! validate the end-to-end protocol behavior: unicast replies, id
//! allocation, delta synchronization, spawn events, and disconnect cleanup.

use futures_util::{SinkExt, StreamExt};
use server::network::{Server, SharedSessions, SharedWorld};
use server::{spawn, sync};
use shared::{decode, encode, Envelope, Vector3};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_tungstenite::tungstenite::Message;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Binds a server on an ephemeral port and spawns its accept loop.
async fn start_server() -> (String, SharedWorld, SharedSessions) {
    let server = Server::bind("127.0.0.1:0").await.expect("bind server");
    let addr = server.local_addr().expect("local addr");
    let world = server.world();
    let sessions = server.sessions();
    tokio::spawn(server.run());

    (format!("ws://{}", addr), world, sessions)
}

async fn connect(url: &str) -> WsClient {
    let (websocket, _) = connect_async(url).await.expect("connect");
    websocket
}

async fn send(client: &mut WsClient, envelope: &Envelope) {
    let json = encode(envelope).expect("encode");
    client.send(Message::text(json)).await.expect("send");
}

async fn recv(client: &mut WsClient) -> Envelope {
    let frame = timeout(Duration::from_secs(2), client.next())
        .await
        .expect("timed out waiting for a frame")
        .expect("connection closed")
        .expect("websocket error");
    decode(frame.to_text().expect("text frame")).expect("decode")
}

async fn assert_silent(client: &mut WsClient) {
    let result = timeout(Duration::from_millis(200), client.next()).await;
    assert!(result.is_err(), "expected no frame, got {:?}", result);
}

/// PROTOCOL TESTS

#[tokio::test]
async fn ping_is_answered_with_a_unicast_pong() {
    let (url, _world, _sessions) = start_server().await;
    let mut alice = connect(&url).await;
    let mut bob = connect(&url).await;

    send(&mut alice, &Envelope::Ping).await;

    assert_eq!(
        recv(&mut alice).await,
        Envelope::Pong {
            message: "pong".to_string()
        }
    );
    // The reply went to the sender only
    assert_silent(&mut bob).await;
}

#[tokio::test]
async fn malformed_messages_leave_the_connection_usable() {
    let (url, world, _sessions) = start_server().await;
    let mut client = connect(&url).await;

    client
        .send(Message::text("this is not an envelope"))
        .await
        .expect("send");
    client
        .send(Message::text(r#"{"method":"login","payload":{"id":1}}"#))
        .await
        .expect("send");

    // Still connected and still answered afterwards
    send(&mut client, &Envelope::Ping).await;
    assert_eq!(
        recv(&mut client).await,
        Envelope::Pong {
            message: "pong".to_string()
        }
    );
    assert!(world.read().await.is_empty());
}

/// STATE SYNCHRONIZATION TESTS

#[tokio::test]
async fn login_update_sync_scenario() {
    let (url, world, sessions) = start_server().await;
    let mut alice = connect(&url).await;
    let mut bob = connect(&url).await;

    // Alice logs in first and therefore gets id 0
    send(
        &mut alice,
        &Envelope::Login {
            name: "Alice".to_string(),
        },
    )
    .await;
    assert_eq!(recv(&mut alice).await, Envelope::LoginResponse { id: 0 });

    send(
        &mut bob,
        &Envelope::Login {
            name: "Bob".to_string(),
        },
    )
    .await;
    assert_eq!(recv(&mut bob).await, Envelope::LoginResponse { id: 1 });

    // Alice moves; the ping round-trip guarantees the update was processed
    send(
        &mut alice,
        &Envelope::PlayerUpdate {
            id: 0,
            position: Vector3::new(1.0, 0.0, 0.0),
        },
    )
    .await;
    send(&mut alice, &Envelope::Ping).await;
    assert!(matches!(recv(&mut alice).await, Envelope::Pong { .. }));

    sync::tick(&world, &sessions).await;

    // One sync to everyone, carrying exactly the player that moved
    let expected = Envelope::Sync {
        players: vec![shared::PlayerState {
            id: 0,
            position: Vector3::new(1.0, 0.0, 0.0),
        }],
    };
    assert_eq!(recv(&mut alice).await, expected);
    assert_eq!(recv(&mut bob).await, expected);

    // Nothing changed since: the next tick is silent
    sync::tick(&world, &sessions).await;
    assert_silent(&mut alice).await;
    assert_silent(&mut bob).await;
}

/// WORLD EVENT TESTS

#[tokio::test]
async fn spawn_fires_only_with_players_present() {
    let (url, world, sessions) = start_server().await;
    let mut alice = connect(&url).await;
    let mut bob = connect(&url).await;

    // Nobody has logged in yet: no broadcast
    spawn::fire(&world, &sessions).await;
    assert_silent(&mut alice).await;

    send(
        &mut alice,
        &Envelope::Login {
            name: "Alice".to_string(),
        },
    )
    .await;
    assert!(matches!(recv(&mut alice).await, Envelope::LoginResponse { .. }));

    spawn::fire(&world, &sessions).await;

    for client in [&mut alice, &mut bob] {
        match recv(client).await {
            Envelope::Spawn { position } => {
                assert!((-5.0..5.0).contains(&position.x));
                assert!((9.0..11.0).contains(&position.y));
                assert!((-5.0..5.0).contains(&position.z));
            }
            other => panic!("expected spawn, got {:?}", other),
        }
    }
}

/// LIFECYCLE TESTS

#[tokio::test]
async fn disconnect_evicts_the_sessions_players() {
    let (url, world, _sessions) = start_server().await;
    let mut client = connect(&url).await;

    send(
        &mut client,
        &Envelope::Login {
            name: "Alice".to_string(),
        },
    )
    .await;
    assert!(matches!(recv(&mut client).await, Envelope::LoginResponse { .. }));
    assert_eq!(world.read().await.len(), 1);

    client.close(None).await.expect("close");
    drop(client);

    // The connection task cleans up asynchronously
    for _ in 0..100 {
        if world.read().await.is_empty() {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("player was not evicted after disconnect");
}
