//! Protocol types shared between the server and its clients.
//!
//! Messages travel as JSON text frames shaped as a tagged envelope:
//! a `method` discriminator plus a `payload` determined by it, e.g.
//! `{"method":"login","payload":{"name":"Alice"}}`. Decoding is closed over
//! the known methods; anything else maps to [`Envelope::Unknown`] so stray
//! or future messages are a handled case rather than a decode failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// World-space position, reported by clients and echoed in broadcasts.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One player's entry in a `sync` broadcast.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub id: u32,
    pub position: Vector3,
}

/// Typed message envelope exchanged over the WebSocket channel.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "method", content = "payload", rename_all = "camelCase")]
pub enum Envelope {
    // Client to server
    Ping,
    Login { name: String },
    PlayerUpdate { id: u32, position: Vector3 },

    // Server to client
    Pong { message: String },
    LoginResponse { id: u32 },
    Sync { players: Vec<PlayerState> },
    Spawn { position: Vector3 },

    /// Any method the server does not recognize. Never sent.
    #[serde(other)]
    Unknown,
}

/// Malformed inbound message: recognized method with a bad payload, or
/// text that is not a well-formed envelope at all.
#[derive(Debug, Error)]
#[error("malformed envelope: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Decodes one text frame into an envelope.
pub fn decode(raw: &str) -> Result<Envelope, DecodeError> {
    serde_json::from_str(raw).map_err(DecodeError)
}

/// Encodes an envelope into the JSON text it travels as.
pub fn encode(envelope: &Envelope) -> serde_json::Result<String> {
    serde_json::to_string(envelope)
}
