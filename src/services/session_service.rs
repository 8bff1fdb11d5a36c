use std::time::SystemTime;

use indexmap::IndexMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::models::{MatchEntity, StatEventEntity, TrainingEntity},
    dto::tracker::{
        AttitudeDefault, FinalizeRequest, SessionSnapshot, StartMatchRequest, StartTrainingRequest,
    },
    error::ServiceError,
    services::{roster_service, sse_events},
    state::{
        SharedState,
        lifecycle::{FinishReason, TrackerEvent},
        session::{Player, SessionContext, TrackerSession},
    },
    stats::{Action, AttitudeGrade, counter_for},
};

/// Open a match session from a stored lineup and persist the match document.
pub async fn start_match(
    state: &SharedState,
    request: StartMatchRequest,
) -> Result<SessionSnapshot, ServiceError> {
    crate::state::transitions::run_transition_with_broadcast(
        state,
        TrackerEvent::StartMatch,
        || async {
            let lineup = roster_service::load_valid_lineup(state, request.lineup_id).await?;
            let store = state.require_stat_store().await?;
            let players = store.list_players(Some(lineup.branch)).await?;
            let roster: IndexMap<Uuid, Player> = players
                .into_iter()
                .map(|entity| (entity.id, Player::from(entity)))
                .collect();

            for &player_id in lineup.formation.values().chain(lineup.libero.iter()) {
                if !roster.contains_key(&player_id) {
                    return Err(ServiceError::InvalidState(format!(
                        "lineup {} references unknown player {player_id}",
                        lineup.id
                    )));
                }
            }

            let session = TrackerSession::new_match(
                request.opponent.clone(),
                roster,
                lineup.formation.clone(),
                lineup.libero,
            );
            store
                .save_match(MatchEntity {
                    id: session.context.context_id(),
                    opponent: request.opponent,
                    branch: lineup.branch,
                    lineup_id: lineup.id,
                    started_at: session.started_at,
                    completed: false,
                    sets_local: 0,
                    sets_rival: 0,
                })
                .await?;

            let snapshot = SessionSnapshot::from(&session);
            let mut guard = state.session().write().await;
            guard.replace(session);
            info!(lineup = %lineup.id, "match session opened");
            Ok(snapshot)
        },
    )
    .await
}

/// Open a training session and persist the attendance document.
pub async fn start_training(
    state: &SharedState,
    request: StartTrainingRequest,
) -> Result<SessionSnapshot, ServiceError> {
    crate::state::transitions::run_transition_with_broadcast(
        state,
        TrackerEvent::StartTraining,
        || async {
            let store = state.require_stat_store().await?;
            let players = store.list_players(None).await?;
            let mut roster = IndexMap::with_capacity(request.attendee_ids.len());
            for attendee in &request.attendee_ids {
                let entity = players
                    .iter()
                    .find(|player| player.id == *attendee)
                    .cloned()
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("player {attendee} does not exist"))
                    })?;
                roster.insert(entity.id, Player::from(entity));
            }

            let session = TrackerSession::new_training(roster);
            store
                .save_training(TrainingEntity {
                    id: session.context.context_id(),
                    started_at: session.started_at,
                    attendees: session.roster.keys().copied().collect(),
                })
                .await?;

            let snapshot = SessionSnapshot::from(&session);
            let mut guard = state.session().write().await;
            guard.replace(session);
            info!(attendees = snapshot.roster.len(), "training session opened");
            Ok(snapshot)
        },
    )
    .await
}

/// Snapshot of the live session, if one is open.
pub async fn current_snapshot(state: &SharedState) -> Result<SessionSnapshot, ServiceError> {
    let guard = state.session().read().await;
    let session = guard
        .as_ref()
        .ok_or_else(|| ServiceError::NotFound("no live session".into()))?;
    Ok(SessionSnapshot::from(session))
}

/// Discard the live session without grading anyone.
pub async fn abandon(state: &SharedState) -> Result<(), ServiceError> {
    let session_id = crate::state::transitions::run_transition_with_broadcast(
        state,
        TrackerEvent::Finalize(FinishReason::Abandoned),
        || async {
            let mut guard = state.session().write().await;
            let session = guard
                .take()
                .ok_or_else(|| ServiceError::NotFound("no live session".into()))?;
            info!(session = %session.id, "session abandoned");
            Ok(session.id)
        },
    )
    .await?;
    sse_events::broadcast_session_finished(state, session_id, "abandoned");
    Ok(())
}

/// Grade attitude, close the persisted documents and clear the live session.
pub async fn finalize(
    state: &SharedState,
    request: FinalizeRequest,
) -> Result<(), ServiceError> {
    let session_id = crate::state::transitions::run_transition_with_broadcast(
        state,
        TrackerEvent::Finalize(FinishReason::Completed),
        || async {
            let session = {
                let guard = state.session().read().await;
                guard
                    .as_ref()
                    .cloned()
                    .ok_or_else(|| ServiceError::NotFound("no live session".into()))?
            };
            let store = state.require_stat_store().await?;
            let context = session.context.stat_context();

            for entry in &request.attitude {
                if !session.roster.contains_key(&entry.player_id) {
                    return Err(ServiceError::NotFound(format!(
                        "player {} is not in the session roster",
                        entry.player_id
                    )));
                }
                let action = Action::Attitude(entry.grade);
                store
                    .append_event(attitude_event(&session, entry.player_id, action))
                    .await?;
                if let Some(field) = counter_for(&action)
                    && let Err(err) = store
                        .increment_counter(entry.player_id, context, field)
                        .await
                {
                    warn!(
                        player = %entry.player_id, error = %err,
                        "attitude counter increment failed; event log remains authoritative"
                    );
                }
            }

            if let SessionContext::Match { match_id, .. } = session.context {
                store
                    .mark_match_completed(
                        match_id,
                        session.scoreboard.sets_local,
                        session.scoreboard.sets_rival,
                    )
                    .await?;
            }

            let mut guard = state.session().write().await;
            guard.take();
            info!(session = %session.id, graded = request.attitude.len(), "session finalized");
            Ok(session.id)
        },
    )
    .await?;
    sse_events::broadcast_session_finished(state, session_id, "completed");
    Ok(())
}

/// Attitude prefill for a live training session: the grade already
/// recorded in this session where one exists, a neutral `Good` otherwise.
/// Match sessions grade attitude at finalization only and have no prefill.
pub async fn attitude_defaults(
    state: &SharedState,
) -> Result<Vec<AttitudeDefault>, ServiceError> {
    let (session_id, roster_ids) = {
        let guard = state.session().read().await;
        let session = guard
            .as_ref()
            .ok_or_else(|| ServiceError::NotFound("no live session".into()))?;
        if !matches!(session.context, SessionContext::Training { .. }) {
            return Err(ServiceError::InvalidState(
                "attitude prefill is only available for training sessions".into(),
            ));
        }
        let ids: Vec<Uuid> = session.roster.keys().copied().collect();
        (session.context.context_id(), ids)
    };
    let store = state.require_stat_store().await?;
    let recorded = store.session_attitudes(session_id).await?;
    Ok(roster_ids
        .into_iter()
        .map(|player_id| {
            match recorded.iter().find(|entry| entry.player_id == player_id) {
                Some(entry) => AttitudeDefault {
                    player_id,
                    grade: entry.grade,
                    recorded: true,
                },
                None => AttitudeDefault {
                    player_id,
                    grade: AttitudeGrade::Good,
                    recorded: false,
                },
            }
        })
        .collect())
}

fn attitude_event(session: &TrackerSession, player_id: Uuid, action: Action) -> StatEventEntity {
    let (set_number, score_local, score_rival) = match session.context {
        SessionContext::Match { .. } => (
            Some(session.scoreboard.current_set),
            Some(session.scoreboard.score_local),
            Some(session.scoreboard.score_rival),
        ),
        SessionContext::Training { .. } => (None, None, None),
    };
    StatEventEntity {
        id: Uuid::new_v4(),
        context: session.context.stat_context(),
        context_id: session.context.context_id(),
        player_id,
        action,
        placement: None,
        set_number,
        score_local,
        score_rival,
        recorded_at: SystemTime::now(),
    }
}
