use futures_util::{SinkExt, StreamExt};
use shared::{decode, encode, Envelope, Vector3};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:8080".to_string());

    println!("Connecting to {}", url);
    let (websocket, _) = connect_async(url.as_str()).await?;
    let (mut sink, mut stream) = websocket.split();

    // Ping round-trip first
    println!("Sending ping");
    sink.send(Message::text(encode(&Envelope::Ping)?)).await?;

    // Log in and wait for the issued id
    println!("Logging in as tester");
    sink.send(Message::text(encode(&Envelope::Login {
        name: "tester".to_string(),
    })?))
    .await?;

    let mut player_id = None;
    while player_id.is_none() {
        let frame = match timeout(Duration::from_secs(5), stream.next()).await {
            Ok(Some(frame)) => frame?,
            Ok(None) => {
                println!("Server closed the connection before login completed");
                return Ok(());
            }
            Err(_) => {
                println!("Timed out waiting for login response");
                return Ok(());
            }
        };

        if let Ok(raw) = frame.to_text() {
            match decode(raw) {
                Ok(Envelope::Pong { message }) => println!("Received pong: {}", message),
                Ok(Envelope::LoginResponse { id }) => {
                    println!("Logged in with player id {}", id);
                    player_id = Some(id);
                }
                Ok(other) => println!("Received: {:?}", other),
                Err(e) => println!("Failed to decode frame: {}", e),
            }
        }
    }
    let player_id = player_id.unwrap();

    // Walk in a line, printing every broadcast the server sends back
    for step in 0..10 {
        let position = Vector3::new(step as f32, 0.0, 0.0);
        println!("Reporting position ({}, 0, 0)", step);
        sink.send(Message::text(encode(&Envelope::PlayerUpdate {
            id: player_id,
            position,
        })?))
        .await?;

        // Drain broadcasts until the next step
        while let Ok(Some(frame)) = timeout(Duration::from_millis(900), stream.next()).await {
            let frame = frame?;
            let Ok(raw) = frame.to_text() else { continue };
            match decode(raw) {
                Ok(Envelope::Sync { players }) => {
                    println!("Sync with {} player(s):", players.len());
                    for p in players {
                        println!(
                            "  Player {}: ({}, {}, {})",
                            p.id, p.position.x, p.position.y, p.position.z
                        );
                    }
                }
                Ok(Envelope::Spawn { position }) => {
                    println!(
                        "Item spawned at ({}, {}, {})",
                        position.x, position.y, position.z
                    );
                }
                Ok(other) => println!("Received: {:?}", other),
                Err(e) => println!("Failed to decode frame: {}", e),
            }
        }

        sleep(Duration::from_millis(100)).await;
    }

    println!("Closing connection");
    sink.send(Message::Close(None)).await?;
    println!("Test client finished");

    Ok(())
}
