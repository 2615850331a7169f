//! Payloads carried over the per-game SSE streams.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{questions::Difficulty, state::phase::GamePhase};

#[derive(Clone, Debug)]
/// Dispatched payload carried across a game room's broadcast channel.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }

    /// Build an event with a plain-text data field.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the host starts the game.
pub struct GameStartedEvent {
    pub game_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever the game's lifecycle phase changes.
pub struct GameStatusChangedEvent {
    pub game_id: Uuid,
    pub phase: GamePhase,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a difficulty slot has been claimed by a first correct answer.
///
/// This is the only event carrying state; everything else is a hint for
/// clients to re-pull the resource they care about.
pub struct DifficultyLockedEvent {
    pub game_id: Uuid,
    pub tile_id: u32,
    pub difficulty: Difficulty,
    pub answered_by: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the standings may have changed; clients should re-fetch.
pub struct LeaderboardUpdatedEvent {
    pub game_id: Uuid,
}
