//! Bridges game rooms onto SSE responses.

use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    dto::sse::ServerEvent, error::ServiceError, services::game_service, state::SharedState,
};

/// Subscribe a connection to a game's room after checking the game exists.
pub async fn subscribe(
    state: &SharedState,
    game_id: Uuid,
) -> Result<broadcast::Receiver<ServerEvent>, ServiceError> {
    let store = state.require_game_store().await?;
    game_service::find_game(store.as_ref(), game_id).await?;
    Ok(state.rooms().join(game_id))
}

/// Convert a room receiver into an SSE response, forwarding events and
/// leaving the room once the client disconnects.
pub fn to_sse_stream(
    state: SharedState,
    game_id: Uuid,
    mut receiver: broadcast::Receiver<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from the room and pushes into the mpsc
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged messages but keep the stream alive.
                            continue;
                        }
                    }
                }
            }
        }

        // Leaving inside the task so the room is cleaned up even when the
        // request context has already dropped.
        state.rooms().leave(game_id);
        tracing::info!(%game_id, "SSE subscriber left game room");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
