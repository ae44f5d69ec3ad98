//! Connected-session tracking and outbound message fan-out
//!
//! This module owns the server-side registry of open WebSocket sessions:
//! - Session lifecycle (register on open, unregister on close)
//! - Unicast delivery to a single session (`send_to`)
//! - Broadcast delivery to every session (`broadcast`)
//!
//! Delivery is fire-and-forget: each session holds an unbounded queue that
//! its connection task drains into the socket, so neither the message
//! handlers nor the periodic tasks ever block on a slow client.

use log::{debug, info, warn};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Tracks every open session and routes outbound frames to them.
///
/// The registry stores only the outbound half of each connection. Reading
/// from the socket, decoding, and dispatch happen in the per-connection
/// task; anything that wants to talk back goes through here.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// Outbound queues indexed by session id
    sessions: HashMap<u64, mpsc::UnboundedSender<Message>>,
    /// Next session id to hand out
    next_session_id: u64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a newly opened session and returns its id.
    ///
    /// The sender is the queue drained by that connection's writer task.
    pub fn register(&mut self, sender: mpsc::UnboundedSender<Message>) -> u64 {
        let session_id = self.next_session_id;
        self.next_session_id += 1;

        self.sessions.insert(session_id, sender);
        info!("Session {} registered", session_id);

        session_id
    }

    /// Drops a session, typically when its connection closes.
    ///
    /// Returns true if the session was present.
    pub fn unregister(&mut self, session_id: u64) -> bool {
        if self.sessions.remove(&session_id).is_some() {
            info!("Session {} unregistered", session_id);
            true
        } else {
            false
        }
    }

    /// Queues a text frame for one session.
    ///
    /// Returns false if the session is gone or its connection task has shut
    /// down; the failure is logged and never surfaced to game logic.
    pub fn send_to(&self, session_id: u64, text: &str) -> bool {
        let Some(sender) = self.sessions.get(&session_id) else {
            warn!("Send to unknown session {}", session_id);
            return false;
        };

        debug!("Session {} << {}", session_id, text);
        if sender.send(Message::text(text)).is_err() {
            warn!("Session {} outbound queue is closed", session_id);
            return false;
        }
        true
    }

    /// Queues a text frame for every open session.
    ///
    /// Sessions whose connection task already died are skipped; they get
    /// cleaned up by their own close path.
    pub fn broadcast(&self, text: &str) {
        debug!("Broadcast << {}", text);

        for (session_id, sender) in &self.sessions {
            if sender.send(Message::text(text)).is_err() {
                warn!("Session {} unreachable during broadcast", session_id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
