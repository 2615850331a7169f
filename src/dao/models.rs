use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::{questions::Difficulty, state::phase::GamePhase};

/// Game session record persisted by the storage layer.
///
/// This row is the single source of truth for the lifecycle phase and the
/// host's authority; it is mutated exclusively through
/// [`GameStore::advance_phase`](crate::dao::game_store::GameStore::advance_phase)
/// and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Participant with exclusive authority to start or end the game.
    pub host_id: String,
    /// Current lifecycle phase.
    pub phase: GamePhase,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the game row was updated.
    pub updated_at: SystemTime,
}

impl GameEntity {
    /// Build a fresh game in the lobby phase with a random identifier.
    pub fn new(host_id: String) -> Self {
        let now = SystemTime::now();
        Self {
            id: Uuid::new_v4(),
            host_id,
            phase: GamePhase::Lobby,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A participant's standing within one game.
///
/// `credits` is the cumulative score and never decreases; `available_credits`
/// is the spendable balance and is clamped at zero by the debit primitive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MembershipEntity {
    /// Game this membership belongs to.
    pub game_id: Uuid,
    /// Participant identifier, unique within the game.
    pub participant_id: String,
    /// Cumulative score, monotonically non-decreasing.
    pub credits: i64,
    /// Spendable balance, floored at zero.
    pub available_credits: i64,
    /// Board position marker.
    pub current_tile: u32,
    /// When the participant joined; stable tie-break key for the leaderboard.
    pub joined_at: SystemTime,
}

impl MembershipEntity {
    /// Build a membership with the configured starting balances.
    pub fn new(game_id: Uuid, participant_id: String, starting_credits: i64) -> Self {
        Self {
            game_id,
            participant_id,
            credits: starting_credits,
            available_credits: starting_credits,
            current_tile: 0,
            joined_at: SystemTime::now(),
        }
    }
}

/// Record of which participant first answered a tile difficulty correctly.
///
/// Write-once: created by the conditional insert that decides the winner of
/// concurrent correct submissions, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerLockEntity {
    /// Game this lock belongs to.
    pub game_id: Uuid,
    /// Tile the question is attached to.
    pub tile_id: u32,
    /// Difficulty slot locked by this answer.
    pub difficulty: Difficulty,
    /// Participant whose conditional insert won.
    pub answered_by: String,
    /// Credits awarded to the winner.
    pub reward: i64,
    /// When the lock was created.
    pub locked_at: SystemTime,
}
