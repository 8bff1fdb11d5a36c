use std::time::Instant;

use thiserror::Error;
use uuid::Uuid;

use crate::dao::models::StatContext;

/// High-level phases the tracker can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    /// No session is currently open; the roster and lineups can be browsed.
    Idle,
    /// A live session is open in the given statistics context.
    Tracking(StatContext),
}

/// Indicates how a live session was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The session was played to its natural end.
    Completed,
    /// The coach discarded the session before it finished.
    Abandoned,
}

/// Events that can be applied to the lifecycle machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerEvent {
    /// Open a live match session from idle.
    StartMatch,
    /// Open a live training session from idle.
    StartTraining,
    /// Close the live session and return to idle.
    Finalize(FinishReason),
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the machine was in when the invalid event was received.
    pub from: TrackerPhase,
    /// The event that cannot be applied from this phase.
    pub event: TrackerEvent,
}

/// Errors that can occur when planning a lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A transition is already pending and must be applied or aborted.
    AlreadyPending,
    /// The requested transition is not valid from the current phase.
    InvalidTransition(InvalidTransition),
}

/// Errors that can occur when applying a planned lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
    /// Phase changed since the plan was created.
    PhaseMismatch {
        /// Phase when plan was created.
        expected: TrackerPhase,
        /// Current phase.
        actual: TrackerPhase,
    },
    /// Version changed since the plan was created.
    VersionMismatch {
        /// Version when plan was created.
        expected: usize,
        /// Current version.
        actual: usize,
    },
}

/// Errors that can occur when aborting a planned lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
}

/// Unique identifier for a planned lifecycle transition.
pub type PlanId = Uuid;

/// A planned lifecycle transition that has been validated but not yet applied.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Unique identifier for this plan.
    pub id: PlanId,
    /// Phase the machine is currently in.
    pub from: TrackerPhase,
    /// Phase the machine will transition to.
    pub to: TrackerPhase,
    /// Event that triggered this transition.
    pub event: TrackerEvent,
    /// Version number after applying this transition.
    pub version_next: usize,
    /// Timestamp when this plan was created.
    pub pending_since: Instant,
}

/// Snapshot of the current lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Current phase of the machine.
    pub phase: TrackerPhase,
    /// Version number of the machine (increments on each transition).
    pub version: usize,
    /// Pending transition phase, if a transition is planned but not yet applied.
    pub pending: Option<TrackerPhase>,
}

/// Session lifecycle machine: a single live session at a time, opened and
/// closed through planned transitions so persistence can happen between
/// plan and apply.
#[derive(Debug, Clone)]
pub struct TrackerLifecycle {
    phase: TrackerPhase,
    version: usize,
    pending: Option<Plan>,
}

impl Default for TrackerLifecycle {
    fn default() -> Self {
        Self {
            phase: TrackerPhase::Idle,
            version: 0,
            pending: None,
        }
    }
}

impl TrackerLifecycle {
    /// Create a new lifecycle machine initialised in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    /// Create a snapshot of the current lifecycle state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            version: self.version,
            pending: self.pending.as_ref().map(|plan| plan.to),
        }
    }

    /// Plan a transition by validating that the event can be applied from the
    /// current phase. Returns a Plan that can later be applied or aborted.
    pub fn plan(&mut self, event: TrackerEvent) -> Result<Plan, PlanError> {
        if self.pending.is_some() {
            return Err(PlanError::AlreadyPending);
        }

        let next = self
            .compute_transition(event)
            .map_err(PlanError::InvalidTransition)?;

        let plan = Plan {
            id: Uuid::new_v4(),
            from: self.phase,
            to: next,
            event,
            version_next: self.version + 1,
            pending_since: Instant::now(),
        };

        self.pending = Some(plan.clone());

        Ok(plan)
    }

    /// Apply a planned transition, moving the machine to the next phase.
    /// Returns the new phase after the transition.
    pub fn apply(&mut self, plan_id: PlanId) -> Result<TrackerPhase, ApplyError> {
        let plan = self.pending.take().ok_or(ApplyError::NoPending)?;

        if plan.id != plan_id {
            let expected_plan_id = plan.id;
            self.pending = Some(plan);
            return Err(ApplyError::IdMismatch {
                expected: expected_plan_id,
                got: plan_id,
            });
        }

        if self.phase != plan.from {
            return Err(ApplyError::PhaseMismatch {
                expected: plan.from,
                actual: self.phase,
            });
        }

        if self.version + 1 != plan.version_next {
            return Err(ApplyError::VersionMismatch {
                expected: plan.version_next,
                actual: self.version + 1,
            });
        }

        self.phase = plan.to;
        self.version = plan.version_next;
        self.pending = None;

        Ok(self.phase)
    }

    /// Abort a planned transition without applying it, leaving the machine in
    /// its previous state.
    pub fn abort(&mut self, plan_id: PlanId) -> Result<(), AbortError> {
        let plan = self.pending.as_ref().ok_or(AbortError::NoPending)?;

        if plan.id != plan_id {
            return Err(AbortError::IdMismatch {
                expected: plan.id,
                got: plan_id,
            });
        }

        self.pending = None;
        Ok(())
    }

    fn compute_transition(&self, event: TrackerEvent) -> Result<TrackerPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (TrackerPhase::Idle, TrackerEvent::StartMatch) => {
                TrackerPhase::Tracking(StatContext::Match)
            }
            (TrackerPhase::Idle, TrackerEvent::StartTraining) => {
                TrackerPhase::Tracking(StatContext::Training)
            }
            (TrackerPhase::Tracking(_), TrackerEvent::Finalize(..)) => TrackerPhase::Idle,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(machine: &mut TrackerLifecycle, event: TrackerEvent) -> TrackerPhase {
        let plan = machine.plan(event).unwrap();
        machine.apply(plan.id).unwrap()
    }

    #[test]
    fn initial_state_is_idle() {
        let machine = TrackerLifecycle::new();
        assert_eq!(machine.phase(), TrackerPhase::Idle);
    }

    #[test]
    fn match_session_opens_and_finalizes() {
        let mut machine = TrackerLifecycle::new();
        assert_eq!(
            apply(&mut machine, TrackerEvent::StartMatch),
            TrackerPhase::Tracking(StatContext::Match)
        );
        assert_eq!(
            apply(&mut machine, TrackerEvent::Finalize(FinishReason::Completed)),
            TrackerPhase::Idle
        );
    }

    #[test]
    fn training_session_can_be_abandoned() {
        let mut machine = TrackerLifecycle::new();
        apply(&mut machine, TrackerEvent::StartTraining);
        assert_eq!(
            apply(&mut machine, TrackerEvent::Finalize(FinishReason::Abandoned)),
            TrackerPhase::Idle
        );
    }

    #[test]
    fn only_one_session_at_a_time() {
        let mut machine = TrackerLifecycle::new();
        apply(&mut machine, TrackerEvent::StartMatch);
        let err = machine.plan(TrackerEvent::StartTraining).unwrap_err();
        match err {
            PlanError::InvalidTransition(invalid) => {
                assert_eq!(invalid.from, TrackerPhase::Tracking(StatContext::Match));
                assert_eq!(invalid.event, TrackerEvent::StartTraining);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn finalize_from_idle_is_rejected() {
        let mut machine = TrackerLifecycle::new();
        let err = machine
            .plan(TrackerEvent::Finalize(FinishReason::Completed))
            .unwrap_err();
        assert!(matches!(err, PlanError::InvalidTransition(_)));
    }

    #[test]
    fn second_plan_is_rejected_while_one_is_pending() {
        let mut machine = TrackerLifecycle::new();
        let _plan = machine.plan(TrackerEvent::StartMatch).unwrap();
        assert_eq!(
            machine.plan(TrackerEvent::StartTraining).unwrap_err(),
            PlanError::AlreadyPending
        );
    }

    #[test]
    fn abort_clears_pending() {
        let mut machine = TrackerLifecycle::new();
        let plan = machine.plan(TrackerEvent::StartMatch).unwrap();
        machine.abort(plan.id).unwrap();
        assert!(machine.pending.is_none());
        assert_eq!(machine.phase(), TrackerPhase::Idle);
    }

    #[test]
    fn apply_with_wrong_plan_id_keeps_pending() {
        let mut machine = TrackerLifecycle::new();
        let plan = machine.plan(TrackerEvent::StartMatch).unwrap();
        let err = machine.apply(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ApplyError::IdMismatch { .. }));
        assert!(machine.pending.is_some());
        machine.apply(plan.id).unwrap();
    }
}
