use uuid::Uuid;

use crate::{
    court::Branch,
    dao::models::LineupEntity,
    dto::roster::{LineupSummary, PlayerSummary},
    error::ServiceError,
    state::SharedState,
};

/// List registered players, optionally filtered by club branch.
pub async fn list_players(
    state: &SharedState,
    branch: Option<Branch>,
) -> Result<Vec<PlayerSummary>, ServiceError> {
    let store = state.require_stat_store().await?;
    let players = store.list_players(branch).await?;
    Ok(players.into_iter().map(PlayerSummary::from).collect())
}

/// Fetch a stored lineup and validate its structure before exposing it.
pub async fn get_lineup(state: &SharedState, id: Uuid) -> Result<LineupSummary, ServiceError> {
    let lineup = load_valid_lineup(state, id).await?;
    Ok(LineupSummary::from(lineup))
}

/// Load a lineup from storage, failing when it is missing or malformed.
pub(crate) async fn load_valid_lineup(
    state: &SharedState,
    id: Uuid,
) -> Result<LineupEntity, ServiceError> {
    let store = state.require_stat_store().await?;
    let lineup = store
        .find_lineup(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("lineup {id} does not exist")))?;
    lineup
        .validate()
        .map_err(|err| ServiceError::InvalidState(format!("stored lineup {id} is invalid: {err}")))?;
    Ok(lineup)
}
