use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for VoleyStats Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::live_stream,
        crate::routes::roster::list_players,
        crate::routes::roster::get_lineup,
        crate::routes::session::start_match,
        crate::routes::session::start_training,
        crate::routes::session::current_session,
        crate::routes::session::abandon_session,
        crate::routes::session::attitude_defaults,
        crate::routes::session::finalize_session,
        crate::routes::tracker::record_action,
        crate::routes::tracker::adjust_score,
        crate::routes::tracker::set_initial_server,
        crate::routes::tracker::manual_rotate,
        crate::routes::tracker::request_substitution,
        crate::routes::tracker::eligible_substitutes,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::phase::TrackerPhaseSnapshot,
            crate::dto::roster::PlayerSummary,
            crate::dto::roster::LineupSummary,
            crate::dto::sse::Handshake,
            crate::dto::tracker::StartMatchRequest,
            crate::dto::tracker::StartTrainingRequest,
            crate::dto::tracker::RecordActionRequest,
            crate::dto::tracker::ScoreAdjustRequest,
            crate::dto::tracker::InitialServerRequest,
            crate::dto::tracker::SubstitutionRequest,
            crate::dto::tracker::FinalizeRequest,
            crate::dto::tracker::SessionSnapshot,
            crate::dto::tracker::ActionRecap,
            crate::dto::tracker::ScoreboardDto,
            crate::dto::tracker::AttitudeDefault,
            crate::stats::Action,
            crate::stats::ServePlacement,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "roster", description = "Persisted players and lineups"),
        (name = "session", description = "Live session lifecycle"),
        (name = "tracker", description = "Live tracking operations"),
        (name = "sse", description = "Server-sent events stream"),
    )
)]
pub struct ApiDoc;
