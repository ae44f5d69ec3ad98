//! # Game State Server Library
//!
//! This library provides the authoritative server for a minimal real-time
//! multiplayer world. Clients connect over a persistent WebSocket channel,
//! log in with a nickname, report their position, and receive periodic
//! broadcasts carrying other players' movement plus timed item-spawn events.
//!
//! ## Core Responsibilities
//!
//! ### Message Dispatch
//! Every inbound text frame is decoded into a typed envelope and dispatched
//! by method: `ping` is answered with a unicast `pong`, `login` allocates a
//! fresh player id and inserts the player into the store, and `playerUpdate`
//! overwrites the stored position, flagging it for the next sync pass.
//! Malformed frames are logged and dropped without disturbing the session.
//!
//! ### State Synchronization
//! The sync engine runs on a fixed tick and broadcasts only what changed:
//! players whose position moved since the last tick are collected into a
//! single `sync` envelope, and quiet ticks produce no traffic at all.
//!
//! ### World Events
//! A spawn timer fires every three seconds for the lifetime of the process,
//! rolling a random item position and broadcasting it to every session while
//! at least one player is logged in.
//!
//! ## Architecture Design
//!
//! The player store and session registry are each owned behind an async
//! read-write lock and shared between the per-connection dispatch tasks and
//! the two periodic tasks. All position writes and the sync engine's
//! collect-and-clear scan serialize on the store's write lock, so a moved
//! position is always either observed by the in-flight tick or left flagged
//! for the next one. Outbound delivery is fire-and-forget through unbounded
//! per-session queues; a slow client never blocks game logic.
//!
//! ## Module Organization
//!
//! - [`game`] — the player store: id allocation, position state, dirty flags
//! - [`sessions`] — session registry: unicast and broadcast fan-out
//! - [`network`] — WebSocket accept loop and per-connection dispatch
//! - [`sync`] — the periodic reconciliation tick
//! - [`spawn`] — the fixed-interval world-event timer
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//! use server::{spawn, sync};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind("127.0.0.1:8080").await?;
//!
//!     let world = server.world();
//!     let sessions = server.sessions();
//!     tokio::spawn(sync::run(world.clone(), sessions.clone(), 30));
//!     tokio::spawn(spawn::run(world, sessions));
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod game;
pub mod network;
pub mod sessions;
pub mod spawn;
pub mod sync;
