use std::time::SystemTime;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    court::Slot,
    dao::models::{ServePlacementEntity, StatContext, StatEventEntity},
    dto::{
        roster::PlayerSummary,
        tracker::{
            ActionRecap, InitialServerRequest, RecordActionRequest, ScoreAdjustRequest,
            ScoreboardDto, SessionSnapshot, SubstitutionRequest,
        },
    },
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        session::{SessionContext, TrackerSession},
        set_machine::TeamSide,
    },
    stats::{Category, PointDecision, allowed_categories, counter_for, point_decision},
};

/// Record one graded action: append the event, bump the mapped counter and,
/// in match context, apply the point decision to the scoreboard.
///
/// Match-context serves are additionally gated on serve possession: the
/// tracked team must hold serve, no rally may be live, and the acting
/// player must stand at the serving slot.
pub async fn record_action(
    state: &SharedState,
    request: RecordActionRequest,
) -> Result<ActionRecap, ServiceError> {
    let _gate = state.action_gate().lock().await;

    let mut guard = state.session().write().await;
    let session = guard
        .as_mut()
        .ok_or_else(|| ServiceError::NotFound("no live session".into()))?;
    let player = session
        .roster
        .get(&request.player_id)
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "player {} is not in the session roster",
                request.player_id
            ))
        })?;

    let context = session.context.stat_context();
    let category = request.action.category();
    let eligible = allowed_categories(player.role, context, session.tracked_serving());
    if !eligible.contains(&category) {
        return Err(ServiceError::InvalidInput(format!(
            "{category:?} is not available for {} right now",
            player.name
        )));
    }
    if context == StatContext::Match && category == Category::Serve {
        // A serve can only come from the serving slot, between rallies,
        // while the tracked team actually holds serve.
        if !session.tracked_serving() {
            return Err(ServiceError::InvalidState(
                "serves can only be recorded while the tracked team holds serve".into(),
            ));
        }
        if session.scoreboard.rally_live {
            return Err(ServiceError::InvalidState(
                "a rally is already in progress".into(),
            ));
        }
        if session.formation.get(&Slot::Pos1) != Some(&request.player_id) {
            return Err(ServiceError::InvalidInput(format!(
                "{} does not occupy the serving position",
                player.name
            )));
        }
        let placement = request.placement.as_ref().ok_or_else(|| {
            ServiceError::InvalidInput("match serves require a landing placement".into())
        })?;
        if placement.zone > state.config().serve_zones() {
            return Err(ServiceError::InvalidInput(format!(
                "zone {} is outside the configured serve grid",
                placement.zone
            )));
        }
    }

    let (set_number, score_local, score_rival) = match session.context {
        SessionContext::Match { .. } => (
            Some(session.scoreboard.current_set),
            Some(session.scoreboard.score_local),
            Some(session.scoreboard.score_rival),
        ),
        SessionContext::Training { .. } => (None, None, None),
    };
    let event = StatEventEntity {
        id: Uuid::new_v4(),
        context,
        context_id: session.context.context_id(),
        player_id: request.player_id,
        action: request.action,
        placement: request.placement.map(|p| ServePlacementEntity {
            x_percent: p.x_percent,
            y_percent: p.y_percent,
            zone: p.zone,
        }),
        set_number,
        score_local,
        score_rival,
        recorded_at: SystemTime::now(),
    };

    let store = state.require_stat_store().await?;
    // The event log is authoritative: a failed append rejects the whole
    // action before any counter or scoreboard change.
    store.append_event(event).await?;

    let counter = counter_for(&request.action);
    if let Some(field) = counter
        && let Err(err) = store
            .increment_counter(request.player_id, context, field)
            .await
    {
        warn!(
            player = %request.player_id, field = field.as_str(), error = %err,
            "counter increment failed; event log remains authoritative"
        );
    }

    let mut rotated = false;
    let mut set_recap = None;
    if context == StatContext::Match {
        match point_decision(&request.action) {
            PointDecision::TrackedPoint => {
                let recap = session.apply_rally(TeamSide::Local);
                rotated = recap.rotate_tracked;
                set_recap = recap.set_won;
            }
            PointDecision::RivalPoint => {
                let recap = session.apply_rally(TeamSide::Rival);
                rotated = recap.rotate_tracked;
                set_recap = recap.set_won;
            }
            PointDecision::RallyLive => session.scoreboard.mark_rally_live(),
            PointDecision::NoPoint => {}
        }
    }

    let recap = ActionRecap {
        player_id: request.player_id,
        action: request.action,
        counter: counter.map(|field| field.as_str().to_string()),
        scoreboard: (context == StatContext::Match)
            .then(|| ScoreboardDto::from(&session.scoreboard)),
        rotated,
        set_finished: set_recap.is_some(),
    };
    debug!(player = %recap.player_id, rotated, "action recorded");

    sse_events::broadcast_action_recorded(state, recap.clone());
    if rotated {
        sse_events::broadcast_rotation(state, session);
    }
    if let Some(ref finished) = set_recap {
        sse_events::broadcast_set_finished(
            state,
            finished,
            session.scoreboard.sets_local,
            session.scoreboard.sets_rival,
        );
    }
    Ok(recap)
}

/// Nudge one side's score by a point without any side effect on serve,
/// rotation or set completion.
pub async fn adjust_score(
    state: &SharedState,
    request: ScoreAdjustRequest,
) -> Result<ScoreboardDto, ServiceError> {
    let mut guard = state.session().write().await;
    let session = match_session_mut(guard.as_mut())?;
    session.scoreboard.adjust_score(request.side, request.delta);
    let dto = ScoreboardDto::from(&session.scoreboard);
    sse_events::broadcast_score_changed(state, dto.clone());
    Ok(dto)
}

/// Designate the side serving first in the current set.
pub async fn set_initial_server(
    state: &SharedState,
    request: InitialServerRequest,
) -> Result<ScoreboardDto, ServiceError> {
    let mut guard = state.session().write().await;
    let session = match_session_mut(guard.as_mut())?;
    session
        .scoreboard
        .set_initial_server(request.side)
        .map_err(|err| ServiceError::InvalidState(err.to_string()))?;
    let dto = ScoreboardDto::from(&session.scoreboard);
    sse_events::broadcast_score_changed(state, dto.clone());
    Ok(dto)
}

/// Rotate the tracked formation one position clockwise by hand.
pub async fn manual_rotate(state: &SharedState) -> Result<SessionSnapshot, ServiceError> {
    let mut guard = state.session().write().await;
    let session = match_session_mut(guard.as_mut())?;
    session.rotate();
    sse_events::broadcast_rotation(state, session);
    Ok(SessionSnapshot::from(&*session))
}

/// Swap a court player for a bench player, keeping the slot identity.
pub async fn request_substitution(
    state: &SharedState,
    request: SubstitutionRequest,
) -> Result<SessionSnapshot, ServiceError> {
    let mut guard = state.session().write().await;
    let session = match_session_mut(guard.as_mut())?;
    session.substitute(request.leaving, request.entering)?;
    sse_events::broadcast_substitution(state, request.leaving, request.entering);
    sse_events::broadcast_rotation(state, session);
    Ok(SessionSnapshot::from(&*session))
}

/// Bench players allowed to replace the given court player.
pub async fn eligible_substitutes(
    state: &SharedState,
    leaving: Uuid,
) -> Result<Vec<PlayerSummary>, ServiceError> {
    let guard = state.session().read().await;
    let session = guard
        .as_ref()
        .ok_or_else(|| ServiceError::NotFound("no live session".into()))?;
    if !session.roster.contains_key(&leaving) {
        return Err(ServiceError::NotFound(format!(
            "player {leaving} is not in the session roster"
        )));
    }
    Ok(session
        .eligible_substitutes(leaving)
        .into_iter()
        .map(PlayerSummary::from)
        .collect())
}

fn match_session_mut(
    session: Option<&mut TrackerSession>,
) -> Result<&mut TrackerSession, ServiceError> {
    let session = session.ok_or_else(|| ServiceError::NotFound("no live session".into()))?;
    match session.context {
        SessionContext::Match { .. } => Ok(session),
        SessionContext::Training { .. } => Err(ServiceError::InvalidState(
            "scoreboard operations are only valid in match context".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            Arc, Mutex,
            atomic::{AtomicBool, Ordering},
        },
    };

    use futures::future::BoxFuture;
    use indexmap::IndexMap;

    use super::*;
    use crate::{
        config::AppConfig,
        court::{Branch, Role, Slot},
        dao::{
            models::{
                AttitudeDefaultEntity, LineupEntity, MatchEntity, PlayerEntity, TrainingEntity,
            },
            stat_store::StatStore,
            storage::{StorageError, StorageResult},
        },
        state::{AppState, session::Player},
        stats::{Action, CounterField, ServePlacement, ServeResult},
    };

    #[derive(Default)]
    struct StoreInner {
        events: Mutex<Vec<StatEventEntity>>,
        counters: Mutex<HashMap<(Uuid, StatContext, &'static str), i64>>,
        fail_events: AtomicBool,
        fail_counters: AtomicBool,
    }

    #[derive(Clone, Default)]
    struct RecordingStore(Arc<StoreInner>);

    impl RecordingStore {
        fn event_count(&self) -> usize {
            self.0.events.lock().unwrap().len()
        }

        fn counter(&self, player: Uuid, context: StatContext, field: CounterField) -> i64 {
            self.0
                .counters
                .lock()
                .unwrap()
                .get(&(player, context, field.as_str()))
                .copied()
                .unwrap_or(0)
        }
    }

    impl StatStore for RecordingStore {
        fn list_players(
            &self,
            _branch: Option<Branch>,
        ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn find_lineup(
            &self,
            _id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Option<LineupEntity>>> {
            Box::pin(async { Ok(None) })
        }

        fn save_match(&self, _entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn save_training(&self, _entity: TrainingEntity) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn append_event(&self, event: StatEventEntity) -> BoxFuture<'static, StorageResult<()>> {
            let store = self.clone();
            Box::pin(async move {
                if store.0.fail_events.load(Ordering::SeqCst) {
                    return Err(offline("event log offline"));
                }
                store.0.events.lock().unwrap().push(event);
                Ok(())
            })
        }

        fn increment_counter(
            &self,
            player_id: Uuid,
            context: StatContext,
            field: CounterField,
        ) -> BoxFuture<'static, StorageResult<()>> {
            let store = self.clone();
            Box::pin(async move {
                if store.0.fail_counters.load(Ordering::SeqCst) {
                    return Err(offline("counters offline"));
                }
                *store
                    .0
                    .counters
                    .lock()
                    .unwrap()
                    .entry((player_id, context, field.as_str()))
                    .or_insert(0) += 1;
                Ok(())
            })
        }

        fn mark_match_completed(
            &self,
            _match_id: Uuid,
            _sets_local: u16,
            _sets_rival: u16,
        ) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn session_attitudes(
            &self,
            session_id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Vec<AttitudeDefaultEntity>>> {
            let store = self.clone();
            Box::pin(async move {
                let events = store.0.events.lock().unwrap();
                Ok(events
                    .iter()
                    .filter(|event| event.context_id == session_id)
                    .filter_map(|event| match event.action {
                        Action::Attitude(grade) => Some(AttitudeDefaultEntity {
                            player_id: event.player_id,
                            grade,
                        }),
                        _ => None,
                    })
                    .collect())
            })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn offline(message: &str) -> StorageError {
        StorageError::unavailable(
            message.to_string(),
            std::io::Error::new(std::io::ErrorKind::ConnectionReset, message.to_string()),
        )
    }

    fn player(role: Role) -> Player {
        Player {
            id: Uuid::new_v4(),
            name: format!("{role:?}"),
            number: 7,
            role,
            branch: Branch::Female,
        }
    }

    fn six_roles() -> [Role; 6] {
        [
            Role::Setter,
            Role::Outside,
            Role::Middle,
            Role::Opposite,
            Role::Outside,
            Role::Middle,
        ]
    }

    async fn match_state() -> (crate::state::SharedState, RecordingStore, Vec<Uuid>) {
        let state = AppState::new(AppConfig::default());
        let store = RecordingStore::default();
        state
            .install_stat_store(Arc::new(store.clone()) as Arc<dyn StatStore>)
            .await;

        let court: Vec<Player> = six_roles().into_iter().map(player).collect();
        let bench = player(Role::Outside);
        let court_ids: Vec<Uuid> = court.iter().map(|p| p.id).collect();
        let formation: crate::court::Formation = Slot::ALL
            .iter()
            .zip(&court_ids)
            .map(|(&slot, &id)| (slot, id))
            .collect();
        let mut roster: IndexMap<Uuid, Player> =
            court.into_iter().map(|p| (p.id, p)).collect();
        roster.insert(bench.id, bench);
        let session = crate::state::session::TrackerSession::new_match(
            "Rival CV".into(),
            roster,
            formation,
            None,
        );
        {
            let mut guard = state.session().write().await;
            guard.replace(session);
        }
        (state, store, court_ids)
    }

    fn serve_request(player_id: Uuid, result: ServeResult) -> RecordActionRequest {
        RecordActionRequest {
            player_id,
            action: Action::Serve(result),
            placement: Some(ServePlacement {
                x_percent: 40.0,
                y_percent: 70.0,
                zone: 5,
            }),
        }
    }

    async fn give_serve_to_local(state: &crate::state::SharedState) {
        let mut guard = state.session().write().await;
        let session = guard.as_mut().unwrap();
        session
            .scoreboard
            .set_initial_server(TeamSide::Local)
            .unwrap();
    }

    #[tokio::test]
    async fn match_ace_scores_counts_and_logs_once() {
        let (state, store, court) = match_state().await;
        give_serve_to_local(&state).await;
        let server = court[0];

        let recap = record_action(&state, serve_request(server, ServeResult::Ace))
            .await
            .unwrap();

        assert_eq!(store.event_count(), 1);
        assert_eq!(
            store.counter(server, StatContext::Match, CounterField::ServeAces),
            1
        );
        let scoreboard = recap.scoreboard.unwrap();
        assert_eq!(scoreboard.score_local, 1);
        assert_eq!(scoreboard.score_rival, 0);
        assert!(!recap.rotated);
    }

    #[tokio::test]
    async fn training_ace_counts_without_scoring() {
        let state = AppState::new(AppConfig::default());
        let store = RecordingStore::default();
        state
            .install_stat_store(Arc::new(store.clone()) as Arc<dyn StatStore>)
            .await;
        let attendee = player(Role::Outside);
        let attendee_id = attendee.id;
        let roster: IndexMap<Uuid, Player> = [(attendee_id, attendee)].into_iter().collect();
        {
            let mut guard = state.session().write().await;
            guard.replace(crate::state::session::TrackerSession::new_training(roster));
        }

        let recap = record_action(
            &state,
            RecordActionRequest {
                player_id: attendee_id,
                action: Action::Serve(ServeResult::Ace),
                placement: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(store.event_count(), 1);
        assert_eq!(
            store.counter(attendee_id, StatContext::Training, CounterField::ServeAces),
            1
        );
        assert_eq!(
            store.counter(attendee_id, StatContext::Match, CounterField::ServeAces),
            0
        );
        assert!(recap.scoreboard.is_none());
        assert!(!recap.rotated);
    }

    #[tokio::test]
    async fn event_write_failure_rejects_the_whole_action() {
        let (state, store, court) = match_state().await;
        give_serve_to_local(&state).await;
        store.0.fail_events.store(true, Ordering::SeqCst);

        let err = record_action(&state, serve_request(court[0], ServeResult::Ace)).await;
        assert!(matches!(err, Err(ServiceError::Unavailable(_))));

        assert_eq!(
            store.counter(court[0], StatContext::Match, CounterField::ServeAces),
            0
        );
        let guard = state.session().read().await;
        assert_eq!(guard.as_ref().unwrap().scoreboard.score_local, 0);
    }

    #[tokio::test]
    async fn counter_write_failure_still_scores() {
        let (state, store, court) = match_state().await;
        give_serve_to_local(&state).await;
        store.0.fail_counters.store(true, Ordering::SeqCst);

        let recap = record_action(&state, serve_request(court[0], ServeResult::Ace))
            .await
            .unwrap();

        assert_eq!(store.event_count(), 1);
        assert_eq!(recap.scoreboard.unwrap().score_local, 1);
    }

    #[tokio::test]
    async fn serve_while_rival_holds_serve_is_rejected() {
        let (state, store, court) = match_state().await;
        {
            let mut guard = state.session().write().await;
            guard
                .as_mut()
                .unwrap()
                .scoreboard
                .set_initial_server(TeamSide::Rival)
                .unwrap();
        }

        let err = record_action(&state, serve_request(court[0], ServeResult::Ace)).await;
        assert!(matches!(err, Err(ServiceError::InvalidState(_))));

        assert_eq!(store.event_count(), 0);
        let guard = state.session().read().await;
        let session = guard.as_ref().unwrap();
        // No point, no rotation, no serve change.
        assert_eq!(session.scoreboard.score_local, 0);
        assert_eq!(session.formation.get(&Slot::Pos1), Some(&court[0]));
        assert!(!session.tracked_serving());
    }

    #[tokio::test]
    async fn serve_from_outside_the_serving_slot_is_rejected() {
        let (state, store, court) = match_state().await;
        give_serve_to_local(&state).await;

        let err = record_action(&state, serve_request(court[2], ServeResult::Ace)).await;
        assert!(matches!(err, Err(ServiceError::InvalidInput(_))));
        assert_eq!(store.event_count(), 0);
    }

    #[tokio::test]
    async fn serve_is_rejected_while_a_rally_is_live() {
        let (state, store, court) = match_state().await;
        give_serve_to_local(&state).await;

        record_action(&state, serve_request(court[0], ServeResult::InPlay))
            .await
            .unwrap();
        let err = record_action(&state, serve_request(court[0], ServeResult::Ace)).await;

        assert!(matches!(err, Err(ServiceError::InvalidState(_))));
        assert_eq!(store.event_count(), 1);
    }

    #[tokio::test]
    async fn match_serve_without_placement_is_rejected() {
        let (state, store, court) = match_state().await;
        give_serve_to_local(&state).await;

        let err = record_action(
            &state,
            RecordActionRequest {
                player_id: court[0],
                action: Action::Serve(ServeResult::Ace),
                placement: None,
            },
        )
        .await;

        assert!(matches!(err, Err(ServiceError::InvalidInput(_))));
        assert_eq!(store.event_count(), 0);
    }

    #[tokio::test]
    async fn reception_is_hidden_while_tracked_team_serves() {
        let (state, store, court) = match_state().await;
        give_serve_to_local(&state).await;

        let err = record_action(
            &state,
            RecordActionRequest {
                player_id: court[1],
                action: Action::Reception(crate::stats::ReceptionResult::Good),
                placement: None,
            },
        )
        .await;

        assert!(matches!(err, Err(ServiceError::InvalidInput(_))));
        assert_eq!(store.event_count(), 0);
    }

    #[tokio::test]
    async fn regained_serve_rotates_once() {
        let (state, _store, court) = match_state().await;
        {
            let mut guard = state.session().write().await;
            guard
                .as_mut()
                .unwrap()
                .scoreboard
                .set_initial_server(TeamSide::Rival)
                .unwrap();
        }

        // Rival serving; a kill by the tracked team is a side-out.
        let recap = record_action(
            &state,
            RecordActionRequest {
                player_id: court[3],
                action: Action::Attack(crate::stats::AttackResult::Kill),
                placement: None,
            },
        )
        .await
        .unwrap();

        assert!(recap.rotated);
        let guard = state.session().read().await;
        let session = guard.as_ref().unwrap();
        assert_eq!(session.formation.get(&Slot::Pos1), Some(&court[1]));
        assert!(session.tracked_serving());
    }

    #[tokio::test]
    async fn substituting_an_off_court_player_is_rejected() {
        let (state, _store, court) = match_state().await;
        let stranger = Uuid::new_v4();

        let err = request_substitution(
            &state,
            SubstitutionRequest {
                leaving: stranger,
                entering: court[0],
            },
        )
        .await;

        assert!(matches!(err, Err(ServiceError::NotFound(_))));
        let guard = state.session().read().await;
        assert_eq!(guard.as_ref().unwrap().formation.get(&Slot::Pos1), Some(&court[0]));
    }

    #[tokio::test]
    async fn manual_adjust_never_goes_negative() {
        let (state, _store, _court) = match_state().await;

        let dto = adjust_score(
            &state,
            ScoreAdjustRequest {
                side: TeamSide::Local,
                delta: -1,
            },
        )
        .await
        .unwrap();

        assert_eq!(dto.score_local, 0);
        assert_eq!(dto.current_set, 1);
    }
}
