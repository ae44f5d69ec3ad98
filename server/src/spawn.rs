//! Timed world-event injection, independent of player traffic
//!
//! Every three seconds the server rolls a random item-spawn position and
//! broadcasts it to every session. The timer starts once at server startup
//! and keeps firing for the process lifetime; a skipped or failed firing
//! never stops the next one.

use crate::network::{SharedSessions, SharedWorld};
use log::{info, warn};
use rand::Rng;
use shared::{encode, Envelope, Vector3};
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Fixed wall-clock period between spawn events.
pub const SPAWN_INTERVAL: Duration = Duration::from_millis(3000);

/// Drives [`fire`] on the fixed interval until the server shuts down.
pub async fn run(world: SharedWorld, sessions: SharedSessions) {
    let mut ticker = interval(SPAWN_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // The first tick completes immediately; swallow it so the first spawn
    // lands a full period after startup.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        fire(&world, &sessions).await;
    }
}

/// One firing: roll a position and broadcast it, unless nobody is logged in.
pub async fn fire(world: &SharedWorld, sessions: &SharedSessions) {
    if world.read().await.is_empty() {
        return;
    }

    let position = random_spawn_position(&mut rand::thread_rng());
    match encode(&Envelope::Spawn { position }) {
        Ok(json) => {
            info!(
                "Spawning item at ({}, {}, {})",
                position.x, position.y, position.z
            );
            sessions.read().await.broadcast(&json);
        }
        Err(e) => warn!("Failed to encode spawn broadcast: {}", e),
    }
}

/// Integer sampling with half-open upper bounds: x and z from [-5, 5),
/// y from [9, 11), matching the original event generator.
fn random_spawn_position(rng: &mut impl Rng) -> Vector3 {
    Vector3::new(
        rng.gen_range(-5..5) as f32,
        rng.gen_range(9..11) as f32,
        rng.gen_range(-5..5) as f32,
    )
}
