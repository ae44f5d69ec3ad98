//! Periodic reconciliation broadcasting only the positions that changed
//!
//! Runs once per tick: players whose position changed since the last tick
//! are collected (clearing their dirty flags in the same scan) and sent to
//! every session in a single `sync` envelope. Quiet ticks broadcast nothing,
//! which bounds bandwidth to the size of the per-tick dirty set.

use crate::network::{SharedSessions, SharedWorld};
use log::{debug, warn};
use shared::{encode, Envelope};
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Drives [`tick`] at the configured rate until the server shuts down.
pub async fn run(world: SharedWorld, sessions: SharedSessions, tick_rate: u32) {
    let mut ticker = interval(Duration::from_secs_f32(1.0 / tick_rate as f32));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        tick(&world, &sessions).await;
    }
}

/// One reconciliation pass.
///
/// The collect-and-clear scan runs under the store's write lock, so a
/// concurrent position update is either observed by this tick or left
/// flagged for the next one; it can never be dropped.
pub async fn tick(world: &SharedWorld, sessions: &SharedSessions) {
    let moved = {
        let mut world = world.write().await;
        if world.is_empty() {
            return;
        }
        world.collect_moved()
    };

    if moved.is_empty() {
        return;
    }

    debug!("Sync tick: {} player(s) moved", moved.len());
    match encode(&Envelope::Sync { players: moved }) {
        Ok(json) => sessions.read().await.broadcast(&json),
        Err(e) => warn!("Failed to encode sync broadcast: {}", e),
    }
}
