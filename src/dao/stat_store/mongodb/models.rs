use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    court::Branch,
    dao::models::{MatchEntity, ServePlacementEntity, StatContext, StatEventEntity, TrainingEntity},
    stats::Action,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMatchDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    opponent: String,
    branch: Branch,
    lineup_id: Uuid,
    started_at: DateTime,
    completed: bool,
    sets_local: u16,
    sets_rival: u16,
}

impl From<MatchEntity> for MongoMatchDocument {
    fn from(value: MatchEntity) -> Self {
        Self {
            id: value.id,
            opponent: value.opponent,
            branch: value.branch,
            lineup_id: value.lineup_id,
            started_at: DateTime::from_system_time(value.started_at),
            completed: value.completed,
            sets_local: value.sets_local,
            sets_rival: value.sets_rival,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTrainingDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    started_at: DateTime,
    attendees: Vec<Uuid>,
}

impl From<TrainingEntity> for MongoTrainingDocument {
    fn from(value: TrainingEntity) -> Self {
        Self {
            id: value.id,
            started_at: DateTime::from_system_time(value.started_at),
            attendees: value.attendees,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoStatEventDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    context: StatContext,
    context_id: Uuid,
    player_id: Uuid,
    #[serde(flatten)]
    action: Action,
    placement: Option<ServePlacementEntity>,
    set_number: Option<u16>,
    score_local: Option<u16>,
    score_rival: Option<u16>,
    recorded_at: DateTime,
}

impl From<StatEventEntity> for MongoStatEventDocument {
    fn from(value: StatEventEntity) -> Self {
        Self {
            id: value.id,
            context: value.context,
            context_id: value.context_id,
            player_id: value.player_id,
            action: value.action,
            placement: value.placement,
            set_number: value.set_number,
            score_local: value.score_local,
            score_rival: value.score_rival,
            recorded_at: DateTime::from_system_time(value.recorded_at),
        }
    }
}

/// Projection of an attitude event read back for the training prefill.
#[derive(Debug, Clone, Deserialize)]
pub struct MongoAttitudeEventDocument {
    pub player_id: Uuid,
    #[serde(flatten)]
    pub action: Action,
    pub recorded_at: DateTime,
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}
