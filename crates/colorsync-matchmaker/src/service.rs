//! The matchmaking core: room table and waiting slot.
//!
//! All pairing decisions happen inside one critical section over the room
//! table *and* the waiting slot, which is what keeps the two invariants that
//! matter here:
//!
//! - at most one room is ever `waiting`, and the slot points at it;
//! - a player appears in at most one non-closed room.
//!
//! The service value owns nothing but memory — construct one per process (or
//! one per test) and share it behind an `Arc`. Pairing is strictly FIFO: the
//! slot either holds the next room to fill or is empty.

use std::collections::HashMap;
use std::sync::Mutex;

use colorsync_protocol::{PlayerId, RoomId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MatchmakerError;

/// Lifecycle of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// One player, parked in the waiting slot.
    Waiting,
    /// Two players; the game runtime has been (or is being) told.
    Full,
    /// Emptied by leave or finished; invisible to matchmaking.
    Closed,
}

/// A matchmaking record: up to two players and where they are in the
/// pairing lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub players: Vec<PlayerId>,
    pub status: RoomStatus,
}

/// What a successful `join` did.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// Snapshot of the room after the join.
    pub room: Room,
    /// `true` when this join filled the room — the caller must announce it
    /// to the game runtime.
    pub paired: bool,
}

#[derive(Default)]
struct Tables {
    rooms: HashMap<RoomId, Room>,
    /// Id of the room currently waiting for a second player, if any.
    waiting: Option<RoomId>,
}

/// The matchmaker service value.
pub struct Matchmaker {
    tables: Mutex<Tables>,
}

impl Matchmaker {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
        }
    }

    /// Queues a player: either parks them in a fresh waiting room or pairs
    /// them with the player already waiting.
    ///
    /// The caller is expected to have authenticated the player and verified
    /// they exist; this method only enforces matchmaking invariants.
    pub fn join(&self, player: PlayerId) -> Result<JoinOutcome, MatchmakerError> {
        let mut tables = self.tables.lock().unwrap();

        // Duplicate-queueing checks, waiting room first so the error text
        // distinguishes "still in the queue" from "already playing".
        if let Some(waiting_id) = &tables.waiting {
            if let Some(room) = tables.rooms.get(waiting_id) {
                if room.players.contains(&player) {
                    tracing::info!(%player, room_id = %room.id, "player already in waiting room");
                    return Err(MatchmakerError::AlreadyQueued);
                }
            }
        }
        for room in tables.rooms.values() {
            if room.status != RoomStatus::Closed && room.players.contains(&player) {
                tracing::warn!(%player, room_id = %room.id, "player already in an active room");
                return Err(MatchmakerError::AlreadyInRoom);
            }
        }

        match tables.waiting.take() {
            Some(waiting_id) => {
                let room = tables
                    .rooms
                    .get_mut(&waiting_id)
                    .ok_or(MatchmakerError::RoomNotFound)?;
                room.players.push(player.clone());
                room.status = RoomStatus::Full;
                let snapshot = room.clone();
                tracing::info!(
                    %player,
                    room_id = %snapshot.id,
                    "room filled, 2/2 players"
                );
                Ok(JoinOutcome {
                    room: snapshot,
                    paired: true,
                })
            }
            None => {
                let room = Room {
                    id: RoomId::new(Uuid::new_v4().to_string()),
                    players: vec![player.clone()],
                    status: RoomStatus::Waiting,
                };
                tables.waiting = Some(room.id.clone());
                let snapshot = room.clone();
                tables.rooms.insert(room.id.clone(), room);
                tracing::info!(
                    %player,
                    room_id = %snapshot.id,
                    "room created, waiting for opponent"
                );
                Ok(JoinOutcome {
                    room: snapshot,
                    paired: false,
                })
            }
        }
    }

    /// Snapshot of a room by id.
    pub fn room(&self, id: &RoomId) -> Option<Room> {
        self.tables.lock().unwrap().rooms.get(id).cloned()
    }

    /// Whether a room has both players, plus its current roster.
    pub fn ready(&self, id: &RoomId) -> Option<(bool, Vec<PlayerId>)> {
        let tables = self.tables.lock().unwrap();
        let room = tables.rooms.get(id)?;
        Some((room.players.len() == 2, room.players.clone()))
    }

    /// Removes a player from a room. An emptied room is closed, and the
    /// waiting slot is cleared if it pointed at it.
    pub fn leave(&self, id: &RoomId, player: &PlayerId) -> Result<(), MatchmakerError> {
        let mut guard = self.tables.lock().unwrap();
        let tables = &mut *guard;

        let room = tables
            .rooms
            .get_mut(id)
            .filter(|room| room.status != RoomStatus::Closed)
            .ok_or(MatchmakerError::RoomNotFound)?;

        let before = room.players.len();
        room.players.retain(|p| p != player);
        if room.players.len() == before {
            return Err(MatchmakerError::NotInRoom);
        }

        if room.players.is_empty() {
            room.status = RoomStatus::Closed;
            if tables.waiting.as_ref() == Some(id) {
                tables.waiting = None;
            }
            tracing::info!(%player, room_id = %id, "room emptied and closed");
        } else {
            tracing::info!(%player, room_id = %id, "player left room");
        }
        Ok(())
    }

    /// Id of the room currently in the waiting slot, if any.
    pub fn waiting_room(&self) -> Option<RoomId> {
        self.tables.lock().unwrap().waiting.clone()
    }

    /// Number of rooms in the table, closed ones included.
    pub fn room_count(&self) -> usize {
        self.tables.lock().unwrap().rooms.len()
    }
}

impl Default for Matchmaker {
    fn default() -> Self {
        Self::new()
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

    // =====================================================================
    // join()
    // =====================================================================

    #[test]
    fn test_join_first_player_creates_waiting_room() {
        let mm = Matchmaker::new();

        let outcome = mm.join(pid("alice")).unwrap();

        assert!(!outcome.paired);
        assert_eq!(outcome.room.status, RoomStatus::Waiting);
        assert_eq!(outcome.room.players, vec![pid("alice")]);
        assert_eq!(mm.waiting_room(), Some(outcome.room.id));
    }

    #[test]
    fn test_join_second_player_fills_waiting_room() {
        let mm = Matchmaker::new();
        let first = mm.join(pid("alice")).unwrap();

        let second = mm.join(pid("bob")).unwrap();

        assert!(second.paired);
        assert_eq!(second.room.id, first.room.id);
        assert_eq!(second.room.status, RoomStatus::Full);
        assert_eq!(second.room.players, vec![pid("alice"), pid("bob")]);
        // The slot is free again for the next pair.
        assert_eq!(mm.waiting_room(), None);
    }

    #[test]
    fn test_join_pairs_strictly_fifo() {
        let mm = Matchmaker::new();
        let a = mm.join(pid("a")).unwrap();
        let b = mm.join(pid("b")).unwrap();
        let c = mm.join(pid("c")).unwrap();
        let d = mm.join(pid("d")).unwrap();

        // a+b share the first room, c+d the second.
        assert_eq!(a.room.id, b.room.id);
        assert_eq!(c.room.id, d.room.id);
        assert_ne!(a.room.id, c.room.id);
    }

    #[test]
    fn test_join_duplicate_while_waiting_is_rejected() {
        // A posts /join twice in a row: the second attempt must fail and
        // leave the table untouched — one room, still waiting, only A in it.
        let mm = Matchmaker::new();
        let first = mm.join(pid("alice")).unwrap();

        let result = mm.join(pid("alice"));

        assert!(matches!(result, Err(MatchmakerError::AlreadyQueued)));
        assert_eq!(mm.waiting_room(), Some(first.room.id.clone()));
        assert_eq!(mm.room_count(), 1);
        let room = mm.room(&first.room.id).unwrap();
        assert_eq!(room.players, vec![pid("alice")]);
        assert_eq!(room.status, RoomStatus::Waiting);
    }

    #[test]
    fn test_join_rejected_while_in_full_room() {
        let mm = Matchmaker::new();
        mm.join(pid("alice")).unwrap();
        mm.join(pid("bob")).unwrap();

        let result = mm.join(pid("alice"));

        assert!(matches!(result, Err(MatchmakerError::AlreadyInRoom)));
    }

    #[test]
    fn test_join_allowed_again_after_leaving() {
        let mm = Matchmaker::new();
        let outcome = mm.join(pid("alice")).unwrap();
        mm.leave(&outcome.room.id, &pid("alice")).unwrap();

        // The old room is closed, so alice can queue again.
        let second = mm.join(pid("alice")).unwrap();
        assert_ne!(second.room.id, outcome.room.id);
        assert_eq!(second.room.status, RoomStatus::Waiting);
    }

    #[test]
    fn test_at_most_one_waiting_room() {
        let mm = Matchmaker::new();
        for (i, name) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            mm.join(pid(name)).unwrap();
            // After every join there is at most one waiting room, and the
            // slot agrees with the table.
            let waiting = mm.waiting_room();
            match waiting {
                Some(id) => {
                    let room = mm.room(&id).unwrap();
                    assert_eq!(room.status, RoomStatus::Waiting);
                    assert_eq!(room.players.len(), 1);
                }
                None => assert_eq!(i % 2, 1, "slot only empty after a pairing join"),
            }
        }
    }

    // =====================================================================
    // room() / ready()
    // =====================================================================

    #[test]
    fn test_room_returns_none_for_unknown_id() {
        let mm = Matchmaker::new();
        assert!(mm.room(&RoomId::new("nope")).is_none());
    }

    #[test]
    fn test_ready_false_with_one_player() {
        let mm = Matchmaker::new();
        let outcome = mm.join(pid("alice")).unwrap();

        let (ready, players) = mm.ready(&outcome.room.id).unwrap();

        assert!(!ready);
        assert_eq!(players, vec![pid("alice")]);
    }

    #[test]
    fn test_ready_true_with_two_players() {
        let mm = Matchmaker::new();
        mm.join(pid("alice")).unwrap();
        let outcome = mm.join(pid("bob")).unwrap();

        let (ready, players) = mm.ready(&outcome.room.id).unwrap();

        assert!(ready);
        assert_eq!(players.len(), 2);
    }

    // =====================================================================
    // leave()
    // =====================================================================

    #[test]
    fn test_leave_unknown_room_fails() {
        let mm = Matchmaker::new();
        let result = mm.leave(&RoomId::new("nope"), &pid("alice"));
        assert!(matches!(result, Err(MatchmakerError::RoomNotFound)));
    }

    #[test]
    fn test_leave_room_not_joined_fails() {
        let mm = Matchmaker::new();
        let outcome = mm.join(pid("alice")).unwrap();

        let result = mm.leave(&outcome.room.id, &pid("mallory"));

        assert!(matches!(result, Err(MatchmakerError::NotInRoom)));
        // Alice is still queued.
        assert_eq!(mm.waiting_room(), Some(outcome.room.id));
    }

    #[test]
    fn test_leave_waiting_room_clears_slot_and_closes() {
        let mm = Matchmaker::new();
        let outcome = mm.join(pid("alice")).unwrap();

        mm.leave(&outcome.room.id, &pid("alice")).unwrap();

        assert_eq!(mm.waiting_room(), None);
        // The closed room no longer matches lookups through the public API
        // as an active room.
        let room = mm.room(&outcome.room.id).unwrap();
        assert_eq!(room.status, RoomStatus::Closed);
        assert!(room.players.is_empty());
    }

    #[test]
    fn test_leave_full_room_keeps_other_player() {
        let mm = Matchmaker::new();
        mm.join(pid("alice")).unwrap();
        let outcome = mm.join(pid("bob")).unwrap();

        mm.leave(&outcome.room.id, &pid("alice")).unwrap();

        let room = mm.room(&outcome.room.id).unwrap();
        assert_eq!(room.players, vec![pid("bob")]);
        // The room was never re-queued: the slot stays empty.
        assert_eq!(mm.waiting_room(), None);
    }

    // =====================================================================
    // Concurrency
    // =====================================================================

    #[test]
    fn test_concurrent_joins_preserve_pairing_invariants() {
        // 32 players race through join at once: they must pair off into 16
        // full rooms, nobody double-booked, slot left empty.
        let mm = std::sync::Arc::new(Matchmaker::new());
        let names: Vec<String> = (0..32).map(|i| format!("player-{i}")).collect();

        std::thread::scope(|scope| {
            for name in &names {
                let mm = std::sync::Arc::clone(&mm);
                scope.spawn(move || {
                    mm.join(PlayerId::new(name.clone())).unwrap();
                });
            }
        });

        assert_eq!(mm.room_count(), 16);
        assert_eq!(mm.waiting_room(), None);

        // Every player landed in exactly one room: a repeat join is
        // rejected for each of them.
        for name in &names {
            let result = mm.join(PlayerId::new(name.clone()));
            assert!(
                matches!(
                    result,
                    Err(MatchmakerError::AlreadyQueued) | Err(MatchmakerError::AlreadyInRoom)
                ),
                "{name} should already be paired"
            );
        }
    }

    #[test]
    fn test_leave_twice_fails_second_time() {
        let mm = Matchmaker::new();
        let outcome = mm.join(pid("alice")).unwrap();
        mm.leave(&outcome.room.id, &pid("alice")).unwrap();

        let result = mm.leave(&outcome.room.id, &pid("alice"));

        // The room is closed now, so it is gone from matchmaking's view.
        assert!(matches!(result, Err(MatchmakerError::RoomNotFound)));
    }
}
