//! Membership registry: joining games, the ranked roster and session lookup.

use uuid::Uuid;

use crate::{
    dao::models::MembershipEntity,
    dto::game::{CurrentGameResponse, JoinResponse, LeaderboardResponse},
    error::ServiceError,
    services::{game_service, sse_events},
    state::{SharedState, leaderboard},
};

/// Join a participant to a game.
///
/// The membership row is created through an atomic conditional insert, so a
/// duplicate join can never re-initialise balances; on this synchronous path
/// the duplicate is reported as a conflict.
pub async fn join(
    state: &SharedState,
    game_id: Uuid,
    participant_id: &str,
) -> Result<JoinResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let game = game_service::find_game(store.as_ref(), game_id).await?;
    if !game.phase.is_open() {
        return Err(ServiceError::InvalidState(format!(
            "game `{game_id}` has already ended"
        )));
    }

    let membership = MembershipEntity::new(
        game_id,
        participant_id.to_owned(),
        state.config().starting_credits,
    );
    let snapshot = JoinResponse::from(membership.clone());

    let created = store.insert_membership_if_absent(membership).await?;
    if !created {
        return Err(ServiceError::Conflict(format!(
            "participant `{participant_id}` already joined game `{game_id}`"
        )));
    }

    state.set_current_game(participant_id, game_id);
    sse_events::broadcast_leaderboard_updated(state, game_id);

    Ok(snapshot)
}

/// Ranked roster for a game.
pub async fn leaderboard(
    state: &SharedState,
    game_id: Uuid,
) -> Result<LeaderboardResponse, ServiceError> {
    let store = state.require_game_store().await?;
    game_service::find_game(store.as_ref(), game_id).await?;

    let members = store.list_memberships(game_id).await?;
    Ok(LeaderboardResponse {
        game_id,
        leaderboard: leaderboard::rank(members),
    })
}

/// Game the participant is currently attached to.
pub fn current_game(
    state: &SharedState,
    participant_id: &str,
) -> Result<CurrentGameResponse, ServiceError> {
    state
        .current_game_of(participant_id)
        .map(|game_id| CurrentGameResponse { game_id })
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "participant `{participant_id}` has no current game"
            ))
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::game_store::memory::MemoryGameStore, questions::QuestionBank,
        services::game_service, state::AppState,
    };

    async fn state_with_store() -> SharedState {
        let state = AppState::new(AppConfig::default(), QuestionBank::default());
        state
            .set_game_store(Arc::new(MemoryGameStore::default()))
            .await;
        state
    }

    #[tokio::test]
    async fn duplicate_join_conflicts_and_leaves_the_row_intact() {
        let state = state_with_store().await;
        let game = game_service::create_game(&state, "host").await.unwrap();

        let joined = join(&state, game.game_id, "alice").await.unwrap();
        assert_eq!(joined.credits, 50);

        // Drain credits so a re-initialising join would be visible.
        let store = state.require_game_store().await.unwrap();
        assert!(
            store
                .debit_membership(game.game_id, "alice", 50)
                .await
                .unwrap()
        );

        let err = join(&state, game.game_id, "alice").await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let row = store
            .find_membership(game.game_id, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.available_credits, 0);
        assert_eq!(row.credits, 50);
    }

    #[tokio::test]
    async fn joining_an_ended_game_is_rejected() {
        let state = state_with_store().await;
        let game = game_service::create_game(&state, "host").await.unwrap();
        game_service::end_game(&state, game.game_id, "host")
            .await
            .unwrap();

        let err = join(&state, game.game_id, "alice").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn leaderboard_ranks_host_and_members() {
        let state = state_with_store().await;
        let game = game_service::create_game(&state, "host").await.unwrap();
        join(&state, game.game_id, "alice").await.unwrap();

        let store = state.require_game_store().await.unwrap();
        assert!(
            store
                .credit_membership(game.game_id, "alice", 25)
                .await
                .unwrap()
        );

        let board = leaderboard(&state, game.game_id).await.unwrap();
        assert_eq!(board.leaderboard.len(), 2);
        assert_eq!(board.leaderboard[0].participant_id, "alice");
        assert_eq!(board.leaderboard[0].rank, 1);
        assert_eq!(board.leaderboard[0].credits, 75);
        assert_eq!(board.leaderboard[1].participant_id, "host");
    }

    #[tokio::test]
    async fn current_game_follows_create_and_join() {
        let state = state_with_store().await;
        assert!(matches!(
            current_game(&state, "alice").unwrap_err(),
            ServiceError::NotFound(_)
        ));

        let game = game_service::create_game(&state, "host").await.unwrap();
        join(&state, game.game_id, "alice").await.unwrap();
        assert_eq!(current_game(&state, "alice").unwrap().game_id, game.game_id);
    }
}
