//! Typed helpers emitting room events.

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::sse::{
        DifficultyLockedEvent, GameStartedEvent, GameStatusChangedEvent, LeaderboardUpdatedEvent,
        ServerEvent,
    },
    questions::Difficulty,
    state::{GamePhase, SharedState},
};

const EVENT_GAME_STARTED: &str = "game-started";
const EVENT_GAME_STATUS_CHANGED: &str = "game-status-changed";
const EVENT_DIFFICULTY_LOCKED: &str = "difficulty-locked";
const EVENT_LEADERBOARD_UPDATED: &str = "leaderboard-updated";

/// Broadcast that the host has started the game.
pub fn broadcast_game_started(state: &SharedState, game_id: Uuid) {
    let payload = GameStartedEvent { game_id };
    send_room_event(state, game_id, EVENT_GAME_STARTED, &payload);
}

/// Broadcast a lifecycle phase change for the game.
pub fn broadcast_status_changed(state: &SharedState, game_id: Uuid, phase: GamePhase) {
    let payload = GameStatusChangedEvent { game_id, phase };
    send_room_event(state, game_id, EVENT_GAME_STATUS_CHANGED, &payload);
}

/// Broadcast that a difficulty slot has been claimed.
pub fn broadcast_difficulty_locked(
    state: &SharedState,
    game_id: Uuid,
    tile_id: u32,
    difficulty: Difficulty,
    answered_by: &str,
) {
    let payload = DifficultyLockedEvent {
        game_id,
        tile_id,
        difficulty,
        answered_by: answered_by.to_owned(),
    };
    send_room_event(state, game_id, EVENT_DIFFICULTY_LOCKED, &payload);
}

/// Nudge subscribers to re-fetch the leaderboard.
pub fn broadcast_leaderboard_updated(state: &SharedState, game_id: Uuid) {
    let payload = LeaderboardUpdatedEvent { game_id };
    send_room_event(state, game_id, EVENT_LEADERBOARD_UPDATED, &payload);
}

fn send_room_event<T: Serialize>(state: &SharedState, game_id: Uuid, event: &str, payload: &T) {
    match ServerEvent::json(Some(event.to_owned()), payload) {
        Ok(event) => state.rooms().emit(game_id, event),
        Err(err) => warn!(%game_id, event, error = %err, "failed to serialise room event"),
    }
}
