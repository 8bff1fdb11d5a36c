use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    court::{Branch, Role, Slot},
    dao::models::{LineupEntity, PlayerEntity},
    state::session::Player,
};

/// Public projection of a club player exposed to REST/SSE clients.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct PlayerSummary {
    pub id: Uuid,
    pub name: String,
    pub number: u8,
    pub role: Role,
    pub branch: Branch,
}

impl From<PlayerEntity> for PlayerSummary {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            number: value.number,
            role: value.role,
            branch: value.branch,
        }
    }
}

impl From<&Player> for PlayerSummary {
    fn from(value: &Player) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            number: value.number,
            role: value.role,
            branch: value.branch,
        }
    }
}

/// One slot of a persisted lineup.
#[derive(Debug, Serialize, ToSchema)]
pub struct LineupSlot {
    pub slot: Slot,
    pub player_id: Uuid,
}

/// Persisted lineup returned by the roster routes.
#[derive(Debug, Serialize, ToSchema)]
pub struct LineupSummary {
    pub id: Uuid,
    pub name: String,
    pub branch: Branch,
    pub formation: Vec<LineupSlot>,
    pub libero: Option<Uuid>,
}

impl From<LineupEntity> for LineupSummary {
    fn from(value: LineupEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            branch: value.branch,
            formation: value
                .formation
                .into_iter()
                .map(|(slot, player_id)| LineupSlot { slot, player_id })
                .collect(),
            libero: value.libero,
        }
    }
}
