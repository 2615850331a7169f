/// Answer submission and first-correct-wins locks.
pub mod answer_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Game lifecycle operations.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Periodic leaderboard re-broadcast task.
pub mod leaderboard_refresher;
/// Two-balance credit ledger.
pub mod ledger_service;
/// Membership registry and leaderboard queries.
pub mod membership_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervisor.
pub mod storage_supervisor;
