//! Answer submission and the first-correct-wins lock flow.

use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::models::AnswerLockEntity,
    dto::game::{AnswerOutcome, AnswerRequest, AnsweredResponse, QuestionsResponse},
    error::ServiceError,
    services::{game_service, ledger_service, sse_events},
    state::{GamePhase, SharedState},
};

/// Submit an answer for a tile difficulty.
///
/// The outcome of concurrent correct submissions is decided entirely by the
/// store's conditional lock insert: the single winner is credited and
/// advances, every loser gets the same `correct: false` response as a wrong
/// answer.
pub async fn submit_answer(
    state: &SharedState,
    game_id: Uuid,
    tile_id: u32,
    participant_id: &str,
    request: AnswerRequest,
) -> Result<AnswerOutcome, ServiceError> {
    let store = state.require_game_store().await?;
    let game = game_service::find_game(store.as_ref(), game_id).await?;
    if game.phase != GamePhase::Active {
        return Err(ServiceError::InvalidState(format!(
            "game `{game_id}` is not active"
        )));
    }

    if store
        .find_membership(game_id, participant_id)
        .await?
        .is_none()
    {
        return Err(ServiceError::Forbidden(
            "only members of the game may answer".into(),
        ));
    }

    let question = state
        .questions()
        .lookup(tile_id, request.difficulty)
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "no {} question for tile {tile_id}",
                request.difficulty
            ))
        })?;

    if !answers_match(&request.answer, &question.correct_answer) {
        return Ok(AnswerOutcome::rejected());
    }

    let lock = AnswerLockEntity {
        game_id,
        tile_id,
        difficulty: request.difficulty,
        answered_by: participant_id.to_owned(),
        reward: question.credits,
        locked_at: std::time::SystemTime::now(),
    };

    let won = store.insert_answer_lock_if_absent(lock).await?;
    if !won {
        // Correct but beaten to the lock; indistinguishable from wrong for
        // the caller.
        return Ok(AnswerOutcome::rejected());
    }

    let credited = ledger_service::award_for_correct_answer(
        store.as_ref(),
        game_id,
        participant_id,
        question.credits,
    )
    .await?;
    if !credited {
        warn!(%game_id, participant_id, "answer lock winner has no membership row");
    }

    if !store
        .set_current_tile(game_id, participant_id, tile_id)
        .await?
    {
        warn!(%game_id, participant_id, "failed to advance winner's current tile");
    }

    sse_events::broadcast_difficulty_locked(
        state,
        game_id,
        tile_id,
        request.difficulty,
        participant_id,
    );
    sse_events::broadcast_leaderboard_updated(state, game_id);

    Ok(AnswerOutcome::won(question.credits))
}

/// Difficulties already locked for a tile, in lock order.
pub async fn answered(
    state: &SharedState,
    game_id: Uuid,
    tile_id: u32,
) -> Result<AnsweredResponse, ServiceError> {
    let store = state.require_game_store().await?;
    game_service::find_game(store.as_ref(), game_id).await?;

    let locks = store.list_answer_locks(game_id, tile_id).await?;
    Ok(AnsweredResponse {
        tile_id,
        answered: locks.into_iter().map(|lock| lock.difficulty).collect(),
    })
}

/// Questions for a tile with the canonical answers withheld.
pub async fn questions(
    state: &SharedState,
    game_id: Uuid,
    tile_id: u32,
) -> Result<QuestionsResponse, ServiceError> {
    let store = state.require_game_store().await?;
    game_service::find_game(store.as_ref(), game_id).await?;

    let questions = state.questions().for_tile(tile_id);
    if questions.is_empty() {
        return Err(ServiceError::NotFound(format!(
            "no questions for tile {tile_id}"
        )));
    }

    Ok(QuestionsResponse {
        tile_id,
        questions: questions.into_iter().map(Into::into).collect(),
    })
}

fn answers_match(submitted: &str, canonical: &str) -> bool {
    submitted.trim().eq_ignore_ascii_case(canonical.trim())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::game_store::memory::MemoryGameStore,
        questions::{Difficulty, Question, QuestionBank},
        services::{game_service, membership_service},
        state::AppState,
    };

    fn bank() -> QuestionBank {
        QuestionBank::from_questions(vec![Question {
            tile_id: 3,
            difficulty: Difficulty::Easy,
            text: "Capital of France?".into(),
            options: vec!["Paris".into(), "Lyon".into()],
            correct_answer: "Paris".into(),
            credits: 10,
        }])
    }

    async fn active_game_with(members: &[&str]) -> (SharedState, Uuid) {
        let state = AppState::new(AppConfig::default(), bank());
        state
            .set_game_store(Arc::new(MemoryGameStore::default()))
            .await;
        let game = game_service::create_game(&state, "host").await.unwrap();
        for member in members {
            membership_service::join(&state, game.game_id, member)
                .await
                .unwrap();
        }
        game_service::start_game(&state, game.game_id, "host")
            .await
            .unwrap();
        (state, game.game_id)
    }

    fn easy(answer: &str) -> AnswerRequest {
        AnswerRequest {
            difficulty: Difficulty::Easy,
            answer: answer.to_owned(),
        }
    }

    #[tokio::test]
    async fn first_correct_answer_wins_and_is_rewarded() {
        let (state, game_id) = active_game_with(&["alice", "bob"]).await;

        let outcome = submit_answer(&state, game_id, 3, "alice", easy("paris"))
            .await
            .unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.credits_earned, 10);

        let store = state.require_game_store().await.unwrap();
        let winner = store
            .find_membership(game_id, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(winner.credits, 60);
        assert_eq!(winner.available_credits, 60);
        assert_eq!(winner.current_tile, 3);

        let listed = answered(&state, game_id, 3).await.unwrap();
        assert_eq!(listed.answered, vec![Difficulty::Easy]);

        // A later matching submission loses the already-decided race.
        let late = submit_answer(&state, game_id, 3, "bob", easy("Paris"))
            .await
            .unwrap();
        assert!(!late.correct);
        assert_eq!(late.credits_earned, 0);
        let loser = store.find_membership(game_id, "bob").await.unwrap().unwrap();
        assert_eq!(loser.credits, 50);
    }

    #[tokio::test]
    async fn concurrent_correct_submissions_produce_one_winner() {
        let (state, game_id) = active_game_with(&["p0", "p1", "p2", "p3"]).await;

        let mut handles = Vec::new();
        for participant in ["p0", "p1", "p2", "p3"] {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                submit_answer(&state, game_id, 3, participant, easy("Paris")).await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            if outcome.correct {
                winners += 1;
                assert_eq!(outcome.credits_earned, 10);
            } else {
                assert_eq!(outcome.credits_earned, 0);
            }
        }
        assert_eq!(winners, 1);

        let store = state.require_game_store().await.unwrap();
        let locks = store.list_answer_locks(game_id, 3).await.unwrap();
        assert_eq!(locks.len(), 1);
    }

    #[tokio::test]
    async fn wrong_answer_changes_nothing() {
        let (state, game_id) = active_game_with(&["alice"]).await;

        let outcome = submit_answer(&state, game_id, 3, "alice", easy("Lyon"))
            .await
            .unwrap();
        assert!(!outcome.correct);

        let listed = answered(&state, game_id, 3).await.unwrap();
        assert!(listed.answered.is_empty());
        let store = state.require_game_store().await.unwrap();
        let row = store
            .find_membership(game_id, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.credits, 50);
        assert_eq!(row.current_tile, 0);
    }

    #[tokio::test]
    async fn non_members_and_inactive_games_are_rejected() {
        let (state, game_id) = active_game_with(&[]).await;

        let err = submit_answer(&state, game_id, 3, "stranger", easy("Paris"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        game_service::end_game(&state, game_id, "host").await.unwrap();
        let err = submit_answer(&state, game_id, 3, "host", easy("Paris"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn unknown_question_reports_not_found() {
        let (state, game_id) = active_game_with(&["alice"]).await;
        let err = submit_answer(&state, game_id, 99, "alice", easy("Paris"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn question_views_withhold_the_answer() {
        let (state, game_id) = active_game_with(&[]).await;
        let views = questions(&state, game_id, 3).await.unwrap();
        assert_eq!(views.questions.len(), 1);
        let serialized = serde_json::to_string(&views).unwrap();
        assert!(!serialized.contains("correct_answer"));
    }
}
