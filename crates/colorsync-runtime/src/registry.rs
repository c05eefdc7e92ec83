//! The game table: room id → game record.
//!
//! Games are created by the matchmaker's announcement and stay resident for
//! the process lifetime — there is no persistence, and a completed game's
//! record doubles as the answer to late status probes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use colorsync_protocol::{PlayerId, RoomId};

use crate::game::Game;
use crate::{GameConfig, RuntimeError};

pub struct GameRegistry {
    games: RwLock<HashMap<RoomId, Arc<Game>>>,
    config: GameConfig,
}

impl GameRegistry {
    pub fn new(config: GameConfig) -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Allocates the game record for an announced room.
    ///
    /// Exactly two distinct players are required. A second announcement for
    /// the same room is a conflict — games are never silently replaced out
    /// from under their connections.
    pub fn create(
        &self,
        room_id: RoomId,
        players: Vec<PlayerId>,
    ) -> Result<Arc<Game>, RuntimeError> {
        if room_id.as_str().is_empty() {
            return Err(RuntimeError::InvalidStartRequest(
                "need room_id and 2 players".into(),
            ));
        }
        let players: [PlayerId; 2] = players.try_into().map_err(|_| {
            RuntimeError::InvalidStartRequest("need room_id and 2 players".into())
        })?;
        if players[0] == players[1] {
            return Err(RuntimeError::InvalidStartRequest(
                "players must be distinct".into(),
            ));
        }

        let mut games = self.games.write().unwrap();
        if games.contains_key(&room_id) {
            return Err(RuntimeError::GameAlreadyExists);
        }

        let game = Arc::new(Game::new(room_id.clone(), players, self.config.clone()));
        games.insert(room_id.clone(), Arc::clone(&game));
        tracing::info!(
            %room_id,
            players = ?game.players(),
            "game created, waiting for connections"
        );
        Ok(game)
    }

    pub fn get(&self, room_id: &RoomId) -> Option<Arc<Game>> {
        self.games.read().unwrap().get(room_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.games.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.read().unwrap().is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    fn registry() -> GameRegistry {
        GameRegistry::new(GameConfig::default())
    }

    #[test]
    fn test_create_and_get() {
        let reg = registry();
        reg.create(RoomId::new("r1"), vec![pid("a"), pid("b")])
            .unwrap();

        let game = reg.get(&RoomId::new("r1")).expect("game should exist");
        assert_eq!(game.players(), &[pid("a"), pid("b")]);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_create_rejects_wrong_player_count() {
        let reg = registry();

        let one = reg.create(RoomId::new("r1"), vec![pid("a")]);
        assert!(matches!(one, Err(RuntimeError::InvalidStartRequest(_))));

        let three = reg.create(RoomId::new("r2"), vec![pid("a"), pid("b"), pid("c")]);
        assert!(matches!(three, Err(RuntimeError::InvalidStartRequest(_))));

        assert!(reg.is_empty());
    }

    #[test]
    fn test_create_rejects_duplicate_player() {
        let reg = registry();
        let result = reg.create(RoomId::new("r1"), vec![pid("a"), pid("a")]);
        assert!(matches!(result, Err(RuntimeError::InvalidStartRequest(_))));
    }

    #[test]
    fn test_create_rejects_empty_room_id() {
        let reg = registry();
        let result = reg.create(RoomId::new(""), vec![pid("a"), pid("b")]);
        assert!(matches!(result, Err(RuntimeError::InvalidStartRequest(_))));
    }

    #[test]
    fn test_create_rejects_duplicate_room() {
        let reg = registry();
        reg.create(RoomId::new("r1"), vec![pid("a"), pid("b")])
            .unwrap();

        let result = reg.create(RoomId::new("r1"), vec![pid("c"), pid("d")]);

        assert!(matches!(result, Err(RuntimeError::GameAlreadyExists)));
        // The original game is untouched.
        let game = reg.get(&RoomId::new("r1")).unwrap();
        assert_eq!(game.players(), &[pid("a"), pid("b")]);
    }

    #[test]
    fn test_get_unknown_room_is_none() {
        let reg = registry();
        assert!(reg.get(&RoomId::new("nope")).is_none());
    }
}
