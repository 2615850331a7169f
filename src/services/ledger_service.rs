//! Two-balance credit ledger operations.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    dao::game_store::GameStore,
    dto::game::{BalanceResponse, CreditAdjustRequest},
    error::ServiceError,
    services::{game_service, sse_events},
    state::SharedState,
};

/// Add credits to a member's balances. Host only.
///
/// Both `credits` and `available_credits` move in one atomic store increment.
pub async fn credit(
    state: &SharedState,
    game_id: Uuid,
    requester: &str,
    request: CreditAdjustRequest,
) -> Result<BalanceResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let game = game_service::find_game(store.as_ref(), game_id).await?;
    game_service::ensure_host(&game, requester)?;

    let applied = store
        .credit_membership(game_id, &request.participant_id, request.amount)
        .await?;
    if !applied {
        return Err(membership_not_found(game_id, &request.participant_id));
    }

    sse_events::broadcast_leaderboard_updated(state, game_id);
    balances(store, game_id, &request.participant_id).await
}

/// Deduct spendable credits from a member. Host only.
///
/// Only `available_credits` moves, clamped at zero inside the store
/// operation; the cumulative `credits` score is untouched.
pub async fn debit(
    state: &SharedState,
    game_id: Uuid,
    requester: &str,
    request: CreditAdjustRequest,
) -> Result<BalanceResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let game = game_service::find_game(store.as_ref(), game_id).await?;
    game_service::ensure_host(&game, requester)?;

    let applied = store
        .debit_membership(game_id, &request.participant_id, request.amount)
        .await?;
    if !applied {
        return Err(membership_not_found(game_id, &request.participant_id));
    }

    sse_events::broadcast_leaderboard_updated(state, game_id);
    balances(store, game_id, &request.participant_id).await
}

/// Credit the winner of an answer race. Internal composition used by the
/// answer flow; shares the ledger's atomic increment.
pub(crate) async fn award_for_correct_answer(
    store: &dyn GameStore,
    game_id: Uuid,
    participant_id: &str,
    reward: i64,
) -> Result<bool, ServiceError> {
    Ok(store
        .credit_membership(game_id, participant_id, reward)
        .await?)
}

async fn balances(
    store: Arc<dyn GameStore>,
    game_id: Uuid,
    participant_id: &str,
) -> Result<BalanceResponse, ServiceError> {
    store
        .find_membership(game_id, participant_id)
        .await?
        .map(Into::into)
        .ok_or_else(|| membership_not_found(game_id, participant_id))
}

fn membership_not_found(game_id: Uuid, participant_id: &str) -> ServiceError {
    ServiceError::NotFound(format!(
        "participant `{participant_id}` is not a member of game `{game_id}`"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::game_store::memory::MemoryGameStore,
        questions::QuestionBank,
        services::{game_service, membership_service},
        state::AppState,
    };

    async fn state_with_game() -> (SharedState, Uuid) {
        let state = AppState::new(AppConfig::default(), QuestionBank::default());
        state
            .set_game_store(Arc::new(MemoryGameStore::default()))
            .await;
        let game = game_service::create_game(&state, "host").await.unwrap();
        membership_service::join(&state, game.game_id, "alice")
            .await
            .unwrap();
        (state, game.game_id)
    }

    fn adjust(participant: &str, amount: i64) -> CreditAdjustRequest {
        CreditAdjustRequest {
            participant_id: participant.to_owned(),
            amount,
        }
    }

    #[tokio::test]
    async fn credit_moves_both_balances() {
        let (state, game_id) = state_with_game().await;
        let balances = credit(&state, game_id, "host", adjust("alice", 30))
            .await
            .unwrap();
        assert_eq!(balances.credits, 80);
        assert_eq!(balances.available_credits, 80);
    }

    #[tokio::test]
    async fn debit_clamps_at_zero_and_preserves_score() {
        let (state, game_id) = state_with_game().await;
        let balances = debit(&state, game_id, "host", adjust("alice", 80))
            .await
            .unwrap();
        assert_eq!(balances.available_credits, 0);
        assert_eq!(balances.credits, 50);
    }

    #[tokio::test]
    async fn non_host_callers_are_rejected() {
        let (state, game_id) = state_with_game().await;
        let err = credit(&state, game_id, "alice", adjust("alice", 10))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn adjusting_a_non_member_reports_not_found() {
        let (state, game_id) = state_with_game().await;
        let err = debit(&state, game_id, "host", adjust("ghost", 10))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
