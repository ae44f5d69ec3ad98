//! WebSocket transport layer and per-connection message dispatch

use crate::game::World;
use crate::sessions::SessionRegistry;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use shared::{decode, encode, Envelope};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::tungstenite::Message;

/// Player store shared between message handlers and the periodic tasks.
pub type SharedWorld = Arc<RwLock<World>>;

/// Session registry shared between connection tasks and the periodic tasks.
pub type SharedSessions = Arc<RwLock<SessionRegistry>>;

/// Accepts WebSocket connections and runs one dispatch task per client.
pub struct Server {
    listener: TcpListener,
    world: SharedWorld,
    sessions: SharedSessions,
}

impl Server {
    /// Binds the listener; the returned server does not accept until
    /// [`Server::run`] is called.
    pub async fn bind(addr: &str) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            world: Arc::new(RwLock::new(World::new())),
            sessions: Arc::new(RwLock::new(SessionRegistry::new())),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle to the player store, for the periodic tasks.
    pub fn world(&self) -> SharedWorld {
        Arc::clone(&self.world)
    }

    /// Handle to the session registry, for the periodic tasks.
    pub fn sessions(&self) -> SharedSessions {
        Arc::clone(&self.sessions)
    }

    /// Accept loop: spawns one task per incoming connection.
    pub async fn run(self) -> io::Result<()> {
        loop {
            let (stream, addr) = self.listener.accept().await?;
            let world = Arc::clone(&self.world);
            let sessions = Arc::clone(&self.sessions);

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, addr, world, sessions).await {
                    warn!("Connection from {} failed: {}", addr, e);
                }
            });
        }
    }
}

/// Owns one client connection from WebSocket handshake to close.
///
/// The reader half dispatches inbound envelopes; a writer task drains the
/// session's outbound queue into the socket. On close the session is
/// unregistered and every player that logged in over it is evicted from
/// the store, so broadcasts never address stale ids.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    world: SharedWorld,
    sessions: SharedSessions,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let websocket = tokio_tungstenite::accept_async(stream).await?;
    info!("WebSocket connection opened from {}", addr);

    let (mut sink, mut reader) = websocket.split();
    let (sender, mut outbound) = mpsc::unbounded_channel::<Message>();
    let session_id = sessions.write().await.register(sender);

    // Writer task: drains queued frames until the session is unregistered.
    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if let Err(e) = sink.send(frame).await {
                warn!("Failed to send frame to {}: {}", addr, e);
                break;
            }
        }
    });

    // Player ids issued over this session, evicted again on close.
    let mut logged_in: Vec<u32> = Vec::new();

    while let Some(frame) = reader.next().await {
        match frame {
            Ok(Message::Text(raw)) => {
                handle_message(raw.as_str(), session_id, &mut logged_in, &world, &sessions).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {} // binary and control frames carry no envelopes
            Err(e) => {
                warn!("WebSocket error from {}: {}", addr, e);
                break;
            }
        }
    }

    sessions.write().await.unregister(session_id);
    if !logged_in.is_empty() {
        let mut world = world.write().await;
        for player_id in logged_in {
            world.remove_player(player_id);
        }
    }
    let _ = writer.await;
    info!("WebSocket connection from {} closed", addr);

    Ok(())
}

/// Decodes one inbound text frame and dispatches it.
///
/// Malformed frames are logged and dropped; the connection stays open and
/// the player store is untouched. Unknown methods and server-only methods
/// arriving inbound are no-ops.
async fn handle_message(
    raw: &str,
    session_id: u64,
    logged_in: &mut Vec<u32>,
    world: &SharedWorld,
    sessions: &SharedSessions,
) {
    debug!("Session {} >> {}", session_id, raw);

    let envelope = match decode(raw) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("Dropping malformed message from session {}: {}", session_id, e);
            return;
        }
    };

    match envelope {
        Envelope::Ping => {
            reply(
                sessions,
                session_id,
                &Envelope::Pong {
                    message: "pong".to_string(),
                },
            )
            .await;
        }
        Envelope::Login { name } => {
            let player_id = world.write().await.login(&name);
            logged_in.push(player_id);
            reply(sessions, session_id, &Envelope::LoginResponse { id: player_id }).await;
        }
        Envelope::PlayerUpdate { id, position } => {
            world.write().await.apply_update(id, position);
        }
        Envelope::Unknown => {
            debug!("Session {} sent an unknown method", session_id);
        }
        other => {
            debug!("Session {} sent a server-only method: {:?}", session_id, other);
        }
    }
}

/// Unicast back to the sender. Encode or delivery failures are logged by
/// the registry and never propagate into dispatch.
async fn reply(sessions: &SharedSessions, session_id: u64, envelope: &Envelope) {
    match encode(envelope) {
        Ok(json) => {
            sessions.read().await.send_to(session_id, &json);
        }
        Err(e) => warn!("Failed to encode reply for session {}: {}", session_id, e),
    }
}
