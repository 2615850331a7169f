//! Routes for tile questions and answer submission.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::game::{AnswerOutcome, AnswerRequest, AnsweredResponse, QuestionsResponse},
    error::AppError,
    routes::identity::Identity,
    services::answer_service,
    state::SharedState,
};

/// Configure the tile routes subtree.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games/{id}/tiles/{tile}/questions", get(tile_questions))
        .route("/games/{id}/tiles/{tile}/answered", get(tile_answered))
        .route("/games/{id}/tiles/{tile}/answer", post(submit_answer))
}

/// Questions for a tile, with canonical answers withheld.
#[utoipa::path(
    get,
    path = "/games/{id}/tiles/{tile}/questions",
    tag = "tile",
    params(
        ("id" = Uuid, Path, description = "Game identifier"),
        ("tile" = u32, Path, description = "Tile number")
    ),
    responses(
        (status = 200, description = "Questions for the tile", body = QuestionsResponse),
        (status = 404, description = "Unknown game or tile")
    )
)]
pub async fn tile_questions(
    State(state): State<SharedState>,
    _identity: Identity,
    Path((id, tile)): Path<(Uuid, u32)>,
) -> Result<Json<QuestionsResponse>, AppError> {
    Ok(Json(answer_service::questions(&state, id, tile).await?))
}

/// Difficulties already locked for a tile.
#[utoipa::path(
    get,
    path = "/games/{id}/tiles/{tile}/answered",
    tag = "tile",
    params(
        ("id" = Uuid, Path, description = "Game identifier"),
        ("tile" = u32, Path, description = "Tile number")
    ),
    responses(
        (status = 200, description = "Locked difficulties", body = AnsweredResponse),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn tile_answered(
    State(state): State<SharedState>,
    _identity: Identity,
    Path((id, tile)): Path<(Uuid, u32)>,
) -> Result<Json<AnsweredResponse>, AppError> {
    Ok(Json(answer_service::answered(&state, id, tile).await?))
}

/// Submit an answer for a tile difficulty. Members only.
#[utoipa::path(
    post,
    path = "/games/{id}/tiles/{tile}/answer",
    tag = "tile",
    params(
        ("id" = Uuid, Path, description = "Game identifier"),
        ("tile" = u32, Path, description = "Tile number")
    ),
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer outcome", body = AnswerOutcome),
        (status = 403, description = "Caller is not a member"),
        (status = 409, description = "Game is not active")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    identity: Identity,
    Path((id, tile)): Path<(Uuid, u32)>,
    Valid(Json(payload)): Valid<Json<AnswerRequest>>,
) -> Result<Json<AnswerOutcome>, AppError> {
    Ok(Json(
        answer_service::submit_answer(&state, id, tile, identity.as_str(), payload).await?,
    ))
}
