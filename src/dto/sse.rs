use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::{
    phase::TrackerPhaseSnapshot,
    tracker::{ActionRecap, CourtSlotView, ScoreboardDto},
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream.
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast whenever the lifecycle phase changes.
pub struct PhaseChangedEvent(pub TrackerPhaseSnapshot);

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast after each successfully recorded action.
pub struct ActionRecordedEvent(pub ActionRecap);

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast whenever the scoreboard changes outside a recorded action.
pub struct ScoreChangedEvent(pub ScoreboardDto);

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever the tracked formation rotates or is edited.
pub struct RotationEvent {
    pub formation: Vec<CourtSlotView>,
    pub resolved_court: Vec<CourtSlotView>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast after a live substitution.
pub struct SubstitutionEvent {
    pub leaving: Uuid,
    pub entering: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a set closes.
pub struct SetFinishedEvent {
    pub set_number: u16,
    pub score_local: u16,
    pub score_rival: u16,
    pub sets_local: u16,
    pub sets_rival: u16,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the live session is finalized or abandoned.
pub struct SessionFinishedEvent {
    pub session_id: Uuid,
    pub reason: String,
}
