use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    court::Branch,
    dto::roster::{LineupSummary, PlayerSummary},
    error::AppError,
    services::roster_service,
    state::SharedState,
};

/// Routes exposing the persisted roster and lineups.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/players", get(list_players))
        .route("/lineups/{id}", get(get_lineup))
}

#[derive(Debug, Deserialize, IntoParams)]
/// Optional branch filter for roster queries.
pub struct PlayersQuery {
    /// Restrict the listing to one club branch.
    pub branch: Option<Branch>,
}

/// List registered players, optionally filtered by branch.
#[utoipa::path(
    get,
    path = "/players",
    tag = "roster",
    params(PlayersQuery),
    responses(
        (status = 200, description = "Registered players", body = [PlayerSummary])
    )
)]
pub async fn list_players(
    State(state): State<SharedState>,
    Query(query): Query<PlayersQuery>,
) -> Result<Json<Vec<PlayerSummary>>, AppError> {
    let players = roster_service::list_players(&state, query.branch).await?;
    Ok(Json(players))
}

/// Fetch one persisted lineup by id.
#[utoipa::path(
    get,
    path = "/lineups/{id}",
    tag = "roster",
    params(("id" = Uuid, Path, description = "Identifier of the lineup")),
    responses(
        (status = 200, description = "Stored lineup", body = LineupSummary)
    )
)]
pub async fn get_lineup(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LineupSummary>, AppError> {
    let lineup = roster_service::get_lineup(&state, id).await?;
    Ok(Json(lineup))
}
