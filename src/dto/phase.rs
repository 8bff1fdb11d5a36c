use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dao::models::StatContext, state::lifecycle::TrackerPhase};

/// Publicly visible tracker phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum VisibleTrackerPhase {
    /// No live session.
    Idle,
    /// A match is being tracked.
    MatchTracking,
    /// A training session is being tracked.
    TrainingTracking,
}

impl From<&TrackerPhase> for VisibleTrackerPhase {
    fn from(value: &TrackerPhase) -> Self {
        match value {
            TrackerPhase::Idle => VisibleTrackerPhase::Idle,
            TrackerPhase::Tracking(StatContext::Match) => VisibleTrackerPhase::MatchTracking,
            TrackerPhase::Tracking(StatContext::Training) => VisibleTrackerPhase::TrainingTracking,
        }
    }
}

/// Shared snapshot describing the current tracker phase and related context.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct TrackerPhaseSnapshot {
    pub phase: VisibleTrackerPhase,
    /// Identifier of the live session, when one is open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    /// True when the backend operates in degraded mode (no connexion to database).
    pub degraded: bool,
}
