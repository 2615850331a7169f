//! Session-scoped participant routes.

use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::game::CurrentGameResponse, error::AppError, routes::identity::Identity,
    services::membership_service, state::SharedState,
};

/// Configure the player routes subtree.
pub fn router() -> Router<SharedState> {
    Router::new().route("/player/current-game", get(current_game))
}

/// Game the caller most recently created or joined.
#[utoipa::path(
    get,
    path = "/player/current-game",
    tag = "player",
    responses(
        (status = 200, description = "Current game pointer", body = CurrentGameResponse),
        (status = 404, description = "No current game")
    )
)]
pub async fn current_game(
    State(state): State<SharedState>,
    identity: Identity,
) -> Result<Json<CurrentGameResponse>, AppError> {
    Ok(Json(membership_service::current_game(
        &state,
        identity.as_str(),
    )?))
}
