//! Periodic leaderboard re-broadcast to every live room.
//!
//! Room events are fire-and-forget, so a subscriber that lagged or connected
//! mid-change can miss a `leaderboard-updated` push. This task bounds that
//! staleness by nudging every active room on a fixed interval.

use tokio::time::interval;

use crate::{services::sse_events, state::SharedState};

/// Run the refresher until the process shuts down.
pub async fn run(state: SharedState) {
    let mut ticker = interval(state.config().leaderboard_refresh);
    // The first tick fires immediately; skip it so startup stays quiet.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        for game_id in state.rooms().active_rooms() {
            sse_events::broadcast_leaderboard_updated(&state, game_id);
        }
    }
}
