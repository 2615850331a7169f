//! Per-game broadcast rooms used for realtime fanout.

use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dto::sse::ServerEvent;

/// Registry of per-game broadcast channels.
///
/// A room exists only while it has subscribers: it is created on the first
/// [`RoomHub::join`] and discarded when the last subscriber leaves. Rooms
/// carry no authoritative state, only notifications.
pub struct RoomHub {
    rooms: DashMap<Uuid, Room>,
    capacity: usize,
}

struct Room {
    sender: broadcast::Sender<ServerEvent>,
    subscribers: usize,
}

impl RoomHub {
    /// Create a hub whose rooms use broadcast channels of `capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            capacity,
        }
    }

    /// Subscribe to a game's room, creating the room on first join.
    ///
    /// Every `join` must be paired with a [`RoomHub::leave`] once the
    /// subscriber disconnects.
    pub fn join(&self, game_id: Uuid) -> broadcast::Receiver<ServerEvent> {
        let mut room = self.rooms.entry(game_id).or_insert_with(|| {
            let (sender, _receiver) = broadcast::channel(self.capacity);
            Room {
                sender,
                subscribers: 0,
            }
        });
        room.subscribers += 1;
        room.sender.subscribe()
    }

    /// Drop one subscription from a game's room, removing the room when it
    /// becomes empty.
    pub fn leave(&self, game_id: Uuid) {
        self.rooms.remove_if_mut(&game_id, |_, room| {
            room.subscribers = room.subscribers.saturating_sub(1);
            room.subscribers == 0
        });
    }

    /// Send an event to every subscriber of a game's room.
    ///
    /// Fire-and-forget: a game without a live room, or a room whose
    /// subscribers all lag, is not an error.
    pub fn emit(&self, game_id: Uuid, event: ServerEvent) {
        if let Some(room) = self.rooms.get(&game_id) {
            let _ = room.sender.send(event);
        }
    }

    /// Identifiers of games that currently have at least one subscriber.
    pub fn active_rooms(&self) -> Vec<Uuid> {
        self.rooms.iter().map(|entry| *entry.key()).collect()
    }

    /// Whether a room currently exists for the game.
    pub fn has_room(&self, game_id: Uuid) -> bool {
        self.rooms.contains_key(&game_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub() -> RoomHub {
        RoomHub::new(8)
    }

    #[tokio::test]
    async fn join_creates_room_and_leave_discards_it() {
        let hub = hub();
        let game = Uuid::new_v4();
        assert!(!hub.has_room(game));

        let _rx = hub.join(game);
        assert!(hub.has_room(game));
        assert_eq!(hub.active_rooms(), vec![game]);

        hub.leave(game);
        assert!(!hub.has_room(game));
        assert!(hub.active_rooms().is_empty());
    }

    #[tokio::test]
    async fn room_survives_until_last_subscriber_leaves() {
        let hub = hub();
        let game = Uuid::new_v4();

        let _first = hub.join(game);
        let _second = hub.join(game);

        hub.leave(game);
        assert!(hub.has_room(game));
        hub.leave(game);
        assert!(!hub.has_room(game));
    }

    #[tokio::test]
    async fn emit_reaches_every_subscriber() {
        let hub = hub();
        let game = Uuid::new_v4();

        let mut first = hub.join(game);
        let mut second = hub.join(game);

        hub.emit(game, ServerEvent::new(Some("ping".into()), "{}".into()));

        assert_eq!(first.recv().await.unwrap().event.as_deref(), Some("ping"));
        assert_eq!(second.recv().await.unwrap().event.as_deref(), Some("ping"));
    }

    #[tokio::test]
    async fn emit_without_room_is_a_no_op() {
        let hub = hub();
        hub.emit(
            Uuid::new_v4(),
            ServerEvent::new(Some("ping".into()), "{}".into()),
        );
    }

    #[tokio::test]
    async fn rooms_are_isolated_per_game() {
        let hub = hub();
        let first_game = Uuid::new_v4();
        let second_game = Uuid::new_v4();

        let mut first = hub.join(first_game);
        let mut second = hub.join(second_game);

        hub.emit(
            first_game,
            ServerEvent::new(Some("ping".into()), "{}".into()),
        );

        assert!(first.recv().await.is_ok());
        assert!(second.try_recv().is_err());
    }
}
