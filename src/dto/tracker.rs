use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    court::{Formation, Slot, libero::game_view},
    dao::models::StatContext,
    dto::{format_system_time, roster::PlayerSummary},
    state::{
        session::{SessionContext, TrackerSession},
        set_machine::{ServeState, SetScoreboard, TeamSide},
    },
    stats::{Action, AttitudeGrade, Category, ServePlacement},
};

/// Payload used to open a match session from a persisted lineup.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartMatchRequest {
    pub lineup_id: Uuid,
    #[validate(length(min = 1, max = 80))]
    pub opponent: String,
}

/// Payload used to open a training session for a set of attendees.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartTrainingRequest {
    #[validate(length(min = 1))]
    pub attendee_ids: Vec<Uuid>,
}

/// Payload recording one graded action for a player.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordActionRequest {
    pub player_id: Uuid,
    /// The graded action (`category` + `result`).
    #[serde(flatten)]
    pub action: Action,
    /// Serve landing point; required for match-context serves.
    #[serde(default)]
    pub placement: Option<ServePlacement>,
}

impl Validate for RecordActionRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref placement) = self.placement {
            if self.action.category() != Category::Serve {
                let mut err = ValidationError::new("placement_without_serve");
                err.message = Some("placement is only valid for serve actions".into());
                errors.add("placement", err);
            }
            if let Err(placement_errors) = placement.validate() {
                errors.merge_self("placement", Err(placement_errors));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload nudging one side's score by a single point.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ScoreAdjustRequest {
    pub side: TeamSide,
    #[validate(range(min = -1, max = 1))]
    pub delta: i8,
}

/// Payload designating the side that serves first.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InitialServerRequest {
    pub side: TeamSide,
}

/// Payload swapping a court player for a bench player.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubstitutionRequest {
    pub leaving: Uuid,
    pub entering: Uuid,
}

/// Attitude grade assigned to one player at finalization.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AttitudeEntry {
    pub player_id: Uuid,
    pub grade: AttitudeGrade,
}

/// Payload closing the live session.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FinalizeRequest {
    /// One grade per graded player; players may be omitted.
    #[serde(default)]
    pub attitude: Vec<AttitudeEntry>,
}

/// Scoreboard projection exposed to REST/SSE clients.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ScoreboardDto {
    pub score_local: u16,
    pub score_rival: u16,
    pub current_set: u16,
    pub sets_local: u16,
    pub sets_rival: u16,
    pub serve: ServeState,
    pub rally_live: bool,
}

impl From<&SetScoreboard> for ScoreboardDto {
    fn from(value: &SetScoreboard) -> Self {
        Self {
            score_local: value.score_local,
            score_rival: value.score_rival,
            current_set: value.current_set,
            sets_local: value.sets_local,
            sets_rival: value.sets_rival,
            serve: value.serve,
            rally_live: value.rally_live,
        }
    }
}

/// One occupied slot of a court projection.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct CourtSlotView {
    pub slot: Slot,
    pub player: PlayerSummary,
}

/// Session context projection (match or training).
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ContextDto {
    pub kind: StatContext,
    pub context_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
}

impl From<&SessionContext> for ContextDto {
    fn from(value: &SessionContext) -> Self {
        match value {
            SessionContext::Match { match_id, opponent } => Self {
                kind: StatContext::Match,
                context_id: *match_id,
                opponent: Some(opponent.clone()),
            },
            SessionContext::Training { session_id } => Self {
                kind: StatContext::Training,
                context_id: *session_id,
                opponent: None,
            },
        }
    }
}

/// Full snapshot of the live session returned by `GET /session`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub context: ContextDto,
    pub started_at: String,
    pub roster: Vec<PlayerSummary>,
    /// Raw formation by rotational slot (real players, no libero swap).
    pub formation: Vec<CourtSlotView>,
    /// Formation as displayed on court (libero swapped in where eligible).
    pub resolved_court: Vec<CourtSlotView>,
    /// Resolved court reordered into canonical tactical slots.
    pub game_view: Vec<CourtSlotView>,
    pub libero: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoreboard: Option<ScoreboardDto>,
}

impl From<&TrackerSession> for SessionSnapshot {
    fn from(session: &TrackerSession) -> Self {
        let resolved = session.resolved_court();
        let view = game_view(&resolved, &session.roster);
        let scoreboard = match session.context {
            SessionContext::Match { .. } => Some(ScoreboardDto::from(&session.scoreboard)),
            SessionContext::Training { .. } => None,
        };
        Self {
            session_id: session.id,
            context: ContextDto::from(&session.context),
            started_at: format_system_time(session.started_at),
            roster: session.roster.values().map(PlayerSummary::from).collect(),
            formation: court_views(&session.formation, session),
            resolved_court: court_views(&resolved, session),
            game_view: court_views(&view, session),
            libero: session.libero,
            scoreboard,
        }
    }
}

pub(crate) fn court_views(formation: &Formation, session: &TrackerSession) -> Vec<CourtSlotView> {
    formation
        .iter()
        .filter_map(|(&slot, player_id)| {
            session.roster.get(player_id).map(|player| CourtSlotView {
                slot,
                player: PlayerSummary::from(player),
            })
        })
        .collect()
}

/// Result of recording one action, returned by `POST /session/actions`.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ActionRecap {
    pub player_id: Uuid,
    /// The action as recorded.
    pub action: Action,
    /// Name of the global counter that was incremented, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<String>,
    /// Updated scoreboard (match context only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoreboard: Option<ScoreboardDto>,
    /// Whether the tracked formation rotated as a consequence.
    pub rotated: bool,
    /// Whether the action closed the current set.
    pub set_finished: bool,
}

/// Attitude prefill row for the training finalization screen.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttitudeDefault {
    pub player_id: Uuid,
    /// Grade already recorded in this session, or the neutral prefill.
    pub grade: AttitudeGrade,
    /// Whether an attitude was already persisted for this session.
    pub recorded: bool,
}
