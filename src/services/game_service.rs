//! Game lifecycle operations: creation, start, end and lookup.

use uuid::Uuid;

use crate::{
    dao::models::{GameEntity, MembershipEntity},
    dto::game::{GameCreatedResponse, GameInfo},
    error::ServiceError,
    services::sse_events,
    state::{GamePhase, SharedState},
};

/// Create a new game hosted by `host_id`, auto-joining the host with the
/// configured starting balances.
pub async fn create_game(
    state: &SharedState,
    host_id: &str,
) -> Result<GameCreatedResponse, ServiceError> {
    let host_id = host_id.trim();
    if host_id.is_empty() {
        return Err(ServiceError::InvalidInput(
            "host identifier must not be empty".into(),
        ));
    }

    let store = state.require_game_store().await?;

    let game = GameEntity::new(host_id.to_owned());
    let game_id = game.id;
    let phase = game.phase;
    store.insert_game(game).await?;

    // A fresh v4 id cannot collide with an existing roster, so the outcome of
    // the conditional insert is not inspected.
    let membership =
        MembershipEntity::new(game_id, host_id.to_owned(), state.config().starting_credits);
    store.insert_membership_if_absent(membership).await?;

    state.set_current_game(host_id, game_id);

    Ok(GameCreatedResponse {
        game_id,
        host_id: host_id.to_owned(),
        phase,
    })
}

/// Fetch game metadata.
pub async fn game_info(state: &SharedState, game_id: Uuid) -> Result<GameInfo, ServiceError> {
    let store = state.require_game_store().await?;
    let game = find_game(store.as_ref(), game_id).await?;
    Ok(game.into())
}

/// Move the game from lobby to active. Host only.
///
/// The broadcast happens after the phase write commits and is best-effort; a
/// room without listeners never rolls back the transition.
pub async fn start_game(
    state: &SharedState,
    game_id: Uuid,
    requester: &str,
) -> Result<GameInfo, ServiceError> {
    let store = state.require_game_store().await?;
    let game = find_game(store.as_ref(), game_id).await?;
    ensure_host(&game, requester)?;

    let advanced = store
        .advance_phase(game_id, GamePhase::Lobby, GamePhase::Active)
        .await?;
    if !advanced {
        return Err(ServiceError::InvalidState(format!(
            "game `{game_id}` is not in the lobby"
        )));
    }

    sse_events::broadcast_game_started(state, game_id);
    sse_events::broadcast_status_changed(state, game_id, GamePhase::Active);

    Ok(GameInfo {
        phase: GamePhase::Active,
        ..game.into()
    })
}

/// End the game. Host only, allowed from any non-terminal phase.
pub async fn end_game(
    state: &SharedState,
    game_id: Uuid,
    requester: &str,
) -> Result<GameInfo, ServiceError> {
    let store = state.require_game_store().await?;
    let game = find_game(store.as_ref(), game_id).await?;
    ensure_host(&game, requester)?;

    if !game.phase.can_advance(GamePhase::Ended) {
        return Err(ServiceError::InvalidState(format!(
            "game `{game_id}` has already ended"
        )));
    }

    // The transition is attempted from the observed phase; a concurrent
    // transition makes the compare-and-set miss and the caller retries.
    let advanced = store
        .advance_phase(game_id, game.phase, GamePhase::Ended)
        .await?;
    if !advanced {
        return Err(ServiceError::InvalidState(format!(
            "game `{game_id}` changed phase concurrently"
        )));
    }

    sse_events::broadcast_status_changed(state, game_id, GamePhase::Ended);

    Ok(GameInfo {
        phase: GamePhase::Ended,
        ..game.into()
    })
}

pub(crate) async fn find_game(
    store: &dyn crate::dao::game_store::GameStore,
    game_id: Uuid,
) -> Result<GameEntity, ServiceError> {
    store
        .find_game(game_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{game_id}` not found")))
}

pub(crate) fn ensure_host(game: &GameEntity, requester: &str) -> Result<(), ServiceError> {
    if game.host_id != requester {
        return Err(ServiceError::Forbidden(
            "only the host may perform this operation".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::game_store::memory::MemoryGameStore, questions::QuestionBank,
        state::AppState,
    };

    async fn state_with_store() -> SharedState {
        let state = AppState::new(AppConfig::default(), QuestionBank::default());
        state
            .set_game_store(Arc::new(MemoryGameStore::default()))
            .await;
        state
    }

    #[tokio::test]
    async fn create_auto_joins_the_host_with_starting_balances() {
        let state = state_with_store().await;
        let created = create_game(&state, "host").await.unwrap();
        assert_eq!(created.phase, GamePhase::Lobby);

        let store = state.require_game_store().await.unwrap();
        let membership = store
            .find_membership(created.game_id, "host")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(membership.credits, 50);
        assert_eq!(membership.available_credits, 50);
        assert_eq!(membership.current_tile, 0);
        assert_eq!(state.current_game_of("host"), Some(created.game_id));
    }

    #[tokio::test]
    async fn blank_host_is_rejected() {
        let state = state_with_store().await;
        let err = create_game(&state, "   ").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn only_the_host_may_start() {
        let state = state_with_store().await;
        let created = create_game(&state, "host").await.unwrap();

        let err = start_game(&state, created.game_id, "mallory")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let info = start_game(&state, created.game_id, "host").await.unwrap();
        assert_eq!(info.phase, GamePhase::Active);
    }

    #[tokio::test]
    async fn start_after_end_is_rejected() {
        let state = state_with_store().await;
        let created = create_game(&state, "host").await.unwrap();

        // Ending straight from the lobby is allowed.
        let info = end_game(&state, created.game_id, "host").await.unwrap();
        assert_eq!(info.phase, GamePhase::Ended);

        let err = start_game(&state, created.game_id, "host")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let err = end_game(&state, created.game_id, "host").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn unknown_game_reports_not_found() {
        let state = state_with_store().await;
        let err = game_info(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
