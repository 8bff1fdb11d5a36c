use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, post},
};
use validator::Validate;

use crate::{
    dto::tracker::{
        AttitudeDefault, FinalizeRequest, SessionSnapshot, StartMatchRequest, StartTrainingRequest,
    },
    error::AppError,
    services::session_service,
    state::SharedState,
};

/// Routes managing the live session lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions/match", post(start_match))
        .route("/sessions/training", post(start_training))
        .route("/session", get(current_session))
        .route("/session", delete(abandon_session))
        .route("/session/attitude-defaults", get(attitude_defaults))
        .route("/session/finalize", post(finalize_session))
}

/// Open a match session from a persisted lineup.
#[utoipa::path(
    post,
    path = "/sessions/match",
    tag = "session",
    request_body = StartMatchRequest,
    responses(
        (status = 200, description = "Match session opened", body = SessionSnapshot)
    )
)]
pub async fn start_match(
    State(state): State<SharedState>,
    Json(payload): Json<StartMatchRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    payload.validate().map_err(AppError::from)?;
    let snapshot = session_service::start_match(&state, payload).await?;
    Ok(Json(snapshot))
}

/// Open a training session for a set of attendees.
#[utoipa::path(
    post,
    path = "/sessions/training",
    tag = "session",
    request_body = StartTrainingRequest,
    responses(
        (status = 200, description = "Training session opened", body = SessionSnapshot)
    )
)]
pub async fn start_training(
    State(state): State<SharedState>,
    Json(payload): Json<StartTrainingRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    payload.validate().map_err(AppError::from)?;
    let snapshot = session_service::start_training(&state, payload).await?;
    Ok(Json(snapshot))
}

/// Snapshot of the live session.
#[utoipa::path(
    get,
    path = "/session",
    tag = "session",
    responses(
        (status = 200, description = "Live session snapshot", body = SessionSnapshot),
        (status = 404, description = "No live session")
    )
)]
pub async fn current_session(
    State(state): State<SharedState>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = session_service::current_snapshot(&state).await?;
    Ok(Json(snapshot))
}

/// Abandon the live session without grading anyone.
#[utoipa::path(
    delete,
    path = "/session",
    tag = "session",
    responses(
        (status = 200, description = "Session abandoned"),
        (status = 404, description = "No live session")
    )
)]
pub async fn abandon_session(State(state): State<SharedState>) -> Result<(), AppError> {
    session_service::abandon(&state).await?;
    Ok(())
}

/// Attitude prefill for every attendee of the live training session.
#[utoipa::path(
    get,
    path = "/session/attitude-defaults",
    tag = "session",
    responses(
        (status = 200, description = "Attitude prefill per attendee", body = [AttitudeDefault]),
        (status = 404, description = "No live session"),
        (status = 409, description = "Live session is not a training session")
    )
)]
pub async fn attitude_defaults(
    State(state): State<SharedState>,
) -> Result<Json<Vec<AttitudeDefault>>, AppError> {
    let defaults = session_service::attitude_defaults(&state).await?;
    Ok(Json(defaults))
}

/// Grade attitude and close the live session.
#[utoipa::path(
    post,
    path = "/session/finalize",
    tag = "session",
    request_body = FinalizeRequest,
    responses(
        (status = 200, description = "Session finalized"),
        (status = 404, description = "No live session")
    )
)]
pub async fn finalize_session(
    State(state): State<SharedState>,
    Json(payload): Json<FinalizeRequest>,
) -> Result<(), AppError> {
    session_service::finalize(&state, payload).await?;
    Ok(())
}
