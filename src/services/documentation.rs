use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Tile Quest Back.
#[openapi(
    paths(
        crate::routes::game::create_game,
        crate::routes::game::get_game,
        crate::routes::game::join_game,
        crate::routes::game::start_game,
        crate::routes::game::end_game,
        crate::routes::game::leaderboard,
        crate::routes::game::add_credits,
        crate::routes::game::deduct_credits,
        crate::routes::tile::tile_questions,
        crate::routes::tile::tile_answered,
        crate::routes::tile::submit_answer,
        crate::routes::player::current_game,
        crate::routes::sse::game_events,
        crate::routes::health::healthcheck,
    ),
    components(
        schemas(
            crate::dto::game::GameCreatedResponse,
            crate::dto::game::GameInfo,
            crate::dto::game::JoinResponse,
            crate::dto::game::RankedMember,
            crate::dto::game::LeaderboardResponse,
            crate::dto::game::CreditAdjustRequest,
            crate::dto::game::BalanceResponse,
            crate::dto::game::AnswerRequest,
            crate::dto::game::AnswerOutcome,
            crate::dto::game::AnsweredResponse,
            crate::dto::game::QuestionView,
            crate::dto::game::QuestionsResponse,
            crate::dto::game::CurrentGameResponse,
            crate::dto::health::HealthResponse,
            crate::dto::sse::GameStartedEvent,
            crate::dto::sse::GameStatusChangedEvent,
            crate::dto::sse::DifficultyLockedEvent,
            crate::dto::sse::LeaderboardUpdatedEvent,
            crate::questions::Difficulty,
            crate::state::phase::GamePhase,
        )
    ),
    tags(
        (name = "game", description = "Game lifecycle, membership and ledger"),
        (name = "tile", description = "Tile questions and answer locks"),
        (name = "player", description = "Session-scoped participant lookups"),
        (name = "sse", description = "Per-game server-sent event streams"),
        (name = "health", description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
