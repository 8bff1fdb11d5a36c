use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        phase::TrackerPhaseSnapshot,
        sse::{
            ActionRecordedEvent, PhaseChangedEvent, RotationEvent, ScoreChangedEvent, ServerEvent,
            SessionFinishedEvent, SetFinishedEvent, SubstitutionEvent, SystemStatus,
        },
        tracker::{ActionRecap, ScoreboardDto},
    },
    state::{SharedState, lifecycle::TrackerPhase, session::TrackerSession, set_machine::SetRecap},
};

const EVENT_PHASE_CHANGED: &str = "phase_changed";
const EVENT_ACTION_RECORDED: &str = "action.recorded";
const EVENT_SCORE_CHANGED: &str = "score.changed";
const EVENT_COURT_ROTATED: &str = "court.rotated";
const EVENT_SUBSTITUTION: &str = "court.substitution";
const EVENT_SET_FINISHED: &str = "set.finished";
const EVENT_SESSION_FINISHED: &str = "session.finished";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast a lifecycle phase change notification.
pub async fn broadcast_phase_changed(state: &SharedState, phase: &TrackerPhase) {
    let session_id = {
        let guard = state.session().read().await;
        guard.as_ref().map(|session| session.id)
    };
    let snapshot = TrackerPhaseSnapshot {
        phase: phase.into(),
        session_id,
        degraded: state.is_degraded().await,
    };
    send_live_event(state, EVENT_PHASE_CHANGED, &PhaseChangedEvent(snapshot));
}

/// Broadcast a successfully recorded action together with its score effect.
pub fn broadcast_action_recorded(state: &SharedState, recap: ActionRecap) {
    send_live_event(state, EVENT_ACTION_RECORDED, &ActionRecordedEvent(recap));
}

/// Broadcast the scoreboard after a manual adjustment or server designation.
pub fn broadcast_score_changed(state: &SharedState, scoreboard: ScoreboardDto) {
    send_live_event(state, EVENT_SCORE_CHANGED, &ScoreChangedEvent(scoreboard));
}

/// Broadcast the formation after a rotation (manual or side-out driven).
pub fn broadcast_rotation(state: &SharedState, session: &TrackerSession) {
    let payload = RotationEvent {
        formation: crate::dto::tracker::court_views(&session.formation, session),
        resolved_court: crate::dto::tracker::court_views(&session.resolved_court(), session),
    };
    send_live_event(state, EVENT_COURT_ROTATED, &payload);
}

/// Broadcast a completed substitution.
pub fn broadcast_substitution(state: &SharedState, leaving: Uuid, entering: Uuid) {
    let payload = SubstitutionEvent { leaving, entering };
    send_live_event(state, EVENT_SUBSTITUTION, &payload);
}

/// Broadcast a finished set together with the updated set tallies.
pub fn broadcast_set_finished(state: &SharedState, recap: &SetRecap, sets_local: u16, sets_rival: u16) {
    let payload = SetFinishedEvent {
        set_number: recap.set_number,
        score_local: recap.score_local,
        score_rival: recap.score_rival,
        sets_local,
        sets_rival,
    };
    send_live_event(state, EVENT_SET_FINISHED, &payload);
}

/// Broadcast the end of the live session.
pub fn broadcast_session_finished(state: &SharedState, session_id: Uuid, reason: &str) {
    let payload = SessionFinishedEvent {
        session_id,
        reason: reason.to_string(),
    };
    send_live_event(state, EVENT_SESSION_FINISHED, &payload);
}

/// Watch the degraded flag and broadcast system status updates on change.
pub fn spawn_system_status_broadcaster(state: SharedState) {
    let mut watcher = state.degraded_watcher();
    tokio::spawn(async move {
        while watcher.changed().await.is_ok() {
            let degraded = *watcher.borrow();
            send_live_event(&state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
        }
    });
}

fn send_live_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.live_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
