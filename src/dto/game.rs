//! Payloads for the game, membership, ledger and question endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{GameEntity, MembershipEntity},
    dto::format_system_time,
    questions::{Difficulty, Question},
    state::phase::GamePhase,
};

/// Response returned when a new game has been created.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameCreatedResponse {
    /// Identifier of the freshly created game.
    pub game_id: Uuid,
    /// Identifier of the hosting participant.
    pub host_id: String,
    /// Lifecycle phase the game starts in.
    pub phase: GamePhase,
}

/// Game metadata returned by the lookup endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameInfo {
    pub game_id: Uuid,
    pub host_id: String,
    pub phase: GamePhase,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl From<GameEntity> for GameInfo {
    fn from(value: GameEntity) -> Self {
        Self {
            game_id: value.id,
            host_id: value.host_id,
            phase: value.phase,
            created_at: format_system_time(value.created_at),
        }
    }
}

/// Membership snapshot returned after a successful join.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinResponse {
    pub game_id: Uuid,
    pub participant_id: String,
    pub credits: i64,
    pub available_credits: i64,
    pub current_tile: u32,
}

impl From<MembershipEntity> for JoinResponse {
    fn from(value: MembershipEntity) -> Self {
        Self {
            game_id: value.game_id,
            participant_id: value.participant_id,
            credits: value.credits,
            available_credits: value.available_credits,
            current_tile: value.current_tile,
        }
    }
}

/// One row of the ranked leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RankedMember {
    /// 1-based rank position.
    pub rank: u32,
    pub participant_id: String,
    pub credits: i64,
    pub available_credits: i64,
    pub current_tile: u32,
}

/// Ranked roster for one game.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    pub game_id: Uuid,
    pub leaderboard: Vec<RankedMember>,
}

/// Payload for the host-driven credit and deduct endpoints.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreditAdjustRequest {
    /// Member whose balance is adjusted.
    #[validate(length(min = 1, message = "participant_id must not be empty"))]
    pub participant_id: String,
    /// Number of credits to add or deduct.
    #[validate(range(
        min = 1,
        max = 1_000_000,
        message = "amount must be between 1 and 1000000"
    ))]
    pub amount: i64,
}

/// Membership balances after a ledger adjustment.
#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    pub game_id: Uuid,
    pub participant_id: String,
    pub credits: i64,
    pub available_credits: i64,
}

impl From<MembershipEntity> for BalanceResponse {
    fn from(value: MembershipEntity) -> Self {
        Self {
            game_id: value.game_id,
            participant_id: value.participant_id,
            credits: value.credits,
            available_credits: value.available_credits,
        }
    }
}

/// Payload submitted when answering a tile question.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AnswerRequest {
    /// Difficulty slot being answered.
    pub difficulty: Difficulty,
    /// The answer the participant selected.
    #[validate(length(min = 1, message = "answer must not be empty"))]
    pub answer: String,
}

/// Outcome of an answer submission.
///
/// A matching answer that lost the first-correct race reports
/// `correct: false` with no credits, same as a wrong answer.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub credits_earned: i64,
}

impl AnswerOutcome {
    pub(crate) fn rejected() -> Self {
        Self {
            correct: false,
            credits_earned: 0,
        }
    }

    pub(crate) fn won(reward: i64) -> Self {
        Self {
            correct: true,
            credits_earned: reward,
        }
    }
}

/// Difficulties already locked for a tile.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnsweredResponse {
    pub tile_id: u32,
    pub answered: Vec<Difficulty>,
}

/// A question as shown to participants, with the canonical answer withheld.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionView {
    pub tile_id: u32,
    pub difficulty: Difficulty,
    pub text: String,
    pub options: Vec<String>,
    /// Credits awarded to the first correct answer.
    pub credits: i64,
}

impl From<&Question> for QuestionView {
    fn from(value: &Question) -> Self {
        Self {
            tile_id: value.tile_id,
            difficulty: value.difficulty,
            text: value.text.clone(),
            options: value.options.clone(),
            credits: value.credits,
        }
    }
}

/// Question views for one tile.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionsResponse {
    pub tile_id: u32,
    pub questions: Vec<QuestionView>,
}

/// The game a participant is currently attached to.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentGameResponse {
    pub game_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjust(amount: i64) -> CreditAdjustRequest {
        CreditAdjustRequest {
            participant_id: "alice".into(),
            amount,
        }
    }

    #[test]
    fn credit_adjust_amount_is_bounded_on_both_ends() {
        assert!(adjust(1).validate().is_ok());
        assert!(adjust(1_000_000).validate().is_ok());

        assert!(adjust(0).validate().is_err());
        assert!(adjust(-5).validate().is_err());
        // Oversized adjustments are rejected before they reach a backend.
        assert!(adjust(1_000_001).validate().is_err());
        assert!(adjust(i64::MAX).validate().is_err());
    }
}
