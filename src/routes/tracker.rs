use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        roster::PlayerSummary,
        tracker::{
            ActionRecap, InitialServerRequest, RecordActionRequest, ScoreAdjustRequest,
            ScoreboardDto, SessionSnapshot, SubstitutionRequest,
        },
    },
    error::AppError,
    services::tracker_service,
    state::SharedState,
};

/// Routes driving the live tracking operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/session/actions", post(record_action))
        .route("/session/score", post(adjust_score))
        .route("/session/server", post(set_initial_server))
        .route("/session/rotate", post(manual_rotate))
        .route("/session/substitutions", post(request_substitution))
        .route("/session/substitutions/{player_id}", get(eligible_substitutes))
}

/// Record one graded action for a player.
#[utoipa::path(
    post,
    path = "/session/actions",
    tag = "tracker",
    request_body = RecordActionRequest,
    responses(
        (status = 200, description = "Action recorded", body = ActionRecap),
        (status = 400, description = "Ineligible or malformed action")
    )
)]
pub async fn record_action(
    State(state): State<SharedState>,
    Json(payload): Json<RecordActionRequest>,
) -> Result<Json<ActionRecap>, AppError> {
    payload.validate().map_err(AppError::from)?;
    let recap = tracker_service::record_action(&state, payload).await?;
    Ok(Json(recap))
}

/// Nudge one side's score by a point.
#[utoipa::path(
    post,
    path = "/session/score",
    tag = "tracker",
    request_body = ScoreAdjustRequest,
    responses(
        (status = 200, description = "Scoreboard after the adjustment", body = ScoreboardDto)
    )
)]
pub async fn adjust_score(
    State(state): State<SharedState>,
    Json(payload): Json<ScoreAdjustRequest>,
) -> Result<Json<ScoreboardDto>, AppError> {
    payload.validate().map_err(AppError::from)?;
    let scoreboard = tracker_service::adjust_score(&state, payload).await?;
    Ok(Json(scoreboard))
}

/// Designate the side serving first in the current set.
#[utoipa::path(
    post,
    path = "/session/server",
    tag = "tracker",
    request_body = InitialServerRequest,
    responses(
        (status = 200, description = "Scoreboard after designating the server", body = ScoreboardDto),
        (status = 409, description = "A server is already designated")
    )
)]
pub async fn set_initial_server(
    State(state): State<SharedState>,
    Json(payload): Json<InitialServerRequest>,
) -> Result<Json<ScoreboardDto>, AppError> {
    let scoreboard = tracker_service::set_initial_server(&state, payload).await?;
    Ok(Json(scoreboard))
}

/// Rotate the tracked formation one position clockwise by hand.
#[utoipa::path(
    post,
    path = "/session/rotate",
    tag = "tracker",
    responses(
        (status = 200, description = "Session after the rotation", body = SessionSnapshot)
    )
)]
pub async fn manual_rotate(
    State(state): State<SharedState>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = tracker_service::manual_rotate(&state).await?;
    Ok(Json(snapshot))
}

/// Swap a court player for a bench player.
#[utoipa::path(
    post,
    path = "/session/substitutions",
    tag = "tracker",
    request_body = SubstitutionRequest,
    responses(
        (status = 200, description = "Session after the substitution", body = SessionSnapshot),
        (status = 400, description = "Substitution violates the court rules")
    )
)]
pub async fn request_substitution(
    State(state): State<SharedState>,
    Json(payload): Json<SubstitutionRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = tracker_service::request_substitution(&state, payload).await?;
    Ok(Json(snapshot))
}

/// Bench players allowed to replace the given court player.
#[utoipa::path(
    get,
    path = "/session/substitutions/{player_id}",
    tag = "tracker",
    params(("player_id" = Uuid, Path, description = "Court player being replaced")),
    responses(
        (status = 200, description = "Eligible bench players", body = [PlayerSummary])
    )
)]
pub async fn eligible_substitutes(
    State(state): State<SharedState>,
    Path(player_id): Path<Uuid>,
) -> Result<Json<Vec<PlayerSummary>>, AppError> {
    let players = tracker_service::eligible_substitutes(&state, player_id).await?;
    Ok(Json(players))
}
