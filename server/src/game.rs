use log::{debug, info};
use shared::{PlayerState, Vector3};
use std::collections::HashMap;

/// A logged-in player as the server sees them.
///
/// `moved` is the dirty flag read by the sync engine: set when a position
/// update actually changes the stored position, cleared when the change has
/// been collected into a broadcast.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub position: Vector3,
    pub moved: bool,
}

/// Authoritative table of logged-in players.
///
/// Exactly one instance exists per server, shared behind a lock: message
/// handlers mutate it, the sync engine drains it. The id counter lives here
/// too so every login path allocates through the same source of truth.
#[derive(Debug, Default)]
pub struct World {
    players: HashMap<u32, Player>,
    next_player_id: u32,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new player and returns the id issued to them.
    ///
    /// Ids are unique for the lifetime of the server, starting at 0.
    /// Names are not checked for uniqueness; login always succeeds.
    pub fn login(&mut self, name: &str) -> u32 {
        let id = self.next_player_id;
        self.next_player_id += 1;

        let player = Player {
            id,
            name: name.to_string(),
            position: Vector3::default(),
            moved: false,
        };
        info!("Player {} ({}) logged in", id, name);
        self.players.insert(id, player);

        id
    }

    /// Applies a client-reported position.
    ///
    /// Unknown ids are ignored. The dirty flag is only raised when the
    /// position actually changes, so repeating the same position does not
    /// produce sync traffic.
    pub fn apply_update(&mut self, id: u32, position: Vector3) {
        match self.players.get_mut(&id) {
            Some(player) if player.position != position => {
                player.position = position;
                player.moved = true;
            }
            Some(_) => {}
            None => debug!("Position update for unknown player {}", id),
        }
    }

    /// Drains the set of players that moved since the last call.
    ///
    /// Each collected player's dirty flag is cleared as it is collected, so
    /// a position is reported at most once unless it changes again. Callers
    /// must hold the store's write lock for the whole scan.
    pub fn collect_moved(&mut self) -> Vec<PlayerState> {
        let mut moved = Vec::new();

        for player in self.players.values_mut() {
            if !player.moved {
                continue;
            }
            moved.push(PlayerState {
                id: player.id,
                position: player.position,
            });
            player.moved = false;
        }

        moved
    }

    /// Evicts a player, typically because their connection closed.
    ///
    /// Returns true if the player was present.
    pub fn remove_player(&mut self, id: u32) -> bool {
        if let Some(player) = self.players.remove(&id) {
            info!("Player {} ({}) removed", player.id, player.name);
            true
        } else {
            false
        }
    }

    pub fn get(&self, id: u32) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
