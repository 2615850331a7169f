//! Routes for game lifecycle, membership, leaderboard and ledger operations.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::game::{
        BalanceResponse, CreditAdjustRequest, GameCreatedResponse, GameInfo, JoinResponse,
        LeaderboardResponse,
    },
    error::AppError,
    routes::identity::Identity,
    services::{game_service, ledger_service, membership_service},
    state::SharedState,
};

/// Configure the game routes subtree.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", post(create_game))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/join", post(join_game))
        .route("/games/{id}/start", post(start_game))
        .route("/games/{id}/end", post(end_game))
        .route("/games/{id}/leaderboard", get(leaderboard))
        .route("/games/{id}/credits/add", post(add_credits))
        .route("/games/{id}/credits/deduct", post(deduct_credits))
}

/// Create a new game hosted by the caller.
#[utoipa::path(
    post,
    path = "/games",
    tag = "game",
    responses(
        (status = 201, description = "Game created", body = GameCreatedResponse),
        (status = 401, description = "Missing identity")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    identity: Identity,
) -> Result<(StatusCode, Json<GameCreatedResponse>), AppError> {
    let created = game_service::create_game(&state, identity.as_str()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Fetch metadata for a game.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game metadata", body = GameInfo),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    _identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<GameInfo>, AppError> {
    Ok(Json(game_service::game_info(&state, id).await?))
}

/// Join the caller to a game.
#[utoipa::path(
    post,
    path = "/games/{id}/join",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 201, description = "Joined", body = JoinResponse),
        (status = 409, description = "Already a member")
    )
)]
pub async fn join_game(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<JoinResponse>), AppError> {
    let joined = membership_service::join(&state, id, identity.as_str()).await?;
    Ok((StatusCode::CREATED, Json(joined)))
}

/// Start the game. Host only.
#[utoipa::path(
    post,
    path = "/games/{id}/start",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game started", body = GameInfo),
        (status = 403, description = "Caller is not the host"),
        (status = 409, description = "Game is not in the lobby")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<GameInfo>, AppError> {
    Ok(Json(
        game_service::start_game(&state, id, identity.as_str()).await?,
    ))
}

/// End the game. Host only.
#[utoipa::path(
    post,
    path = "/games/{id}/end",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game ended", body = GameInfo),
        (status = 403, description = "Caller is not the host"),
        (status = 409, description = "Game already ended")
    )
)]
pub async fn end_game(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<GameInfo>, AppError> {
    Ok(Json(
        game_service::end_game(&state, id, identity.as_str()).await?,
    ))
}

/// Ranked standings for a game.
#[utoipa::path(
    get,
    path = "/games/{id}/leaderboard",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Ranked roster", body = LeaderboardResponse),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn leaderboard(
    State(state): State<SharedState>,
    _identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    Ok(Json(membership_service::leaderboard(&state, id).await?))
}

/// Add credits to a member's balances. Host only.
#[utoipa::path(
    post,
    path = "/games/{id}/credits/add",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = CreditAdjustRequest,
    responses(
        (status = 200, description = "Balances after the credit", body = BalanceResponse),
        (status = 403, description = "Caller is not the host"),
        (status = 404, description = "Unknown game or member")
    )
)]
pub async fn add_credits(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<CreditAdjustRequest>>,
) -> Result<Json<BalanceResponse>, AppError> {
    Ok(Json(
        ledger_service::credit(&state, id, identity.as_str(), payload).await?,
    ))
}

/// Deduct spendable credits from a member. Host only.
#[utoipa::path(
    post,
    path = "/games/{id}/credits/deduct",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = CreditAdjustRequest,
    responses(
        (status = 200, description = "Balances after the deduction", body = BalanceResponse),
        (status = 403, description = "Caller is not the host"),
        (status = 404, description = "Unknown game or member")
    )
)]
pub async fn deduct_credits(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<CreditAdjustRequest>>,
) -> Result<Json<BalanceResponse>, AppError> {
    Ok(Json(
        ledger_service::debit(&state, id, identity.as_str(), payload).await?,
    ))
}
