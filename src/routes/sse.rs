//! Per-game SSE stream route.

use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::Sse,
    routing::get,
};
use futures::Stream;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::AppError, routes::identity::Identity, services::sse_service, state::SharedState,
};

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/games/{id}/events", get(game_events))
}

#[utoipa::path(
    get,
    path = "/games/{id}/events",
    tag = "sse",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game room SSE stream", content_type = "text/event-stream", body = String),
        (status = 404, description = "Unknown game")
    )
)]
/// Stream a game room's realtime events to the caller.
///
/// Subscribing joins the caller to the room; disconnecting leaves it.
pub async fn game_events(
    State(state): State<SharedState>,
    _identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let receiver = sse_service::subscribe(&state, id).await?;
    info!(game_id = %id, "new SSE subscriber for game room");
    Ok(sse_service::to_sse_stream(state, id, receiver))
}
