pub mod lifecycle;
pub mod session;
pub mod set_machine;
mod sse;
pub mod transitions;

use std::{sync::Arc, time::Duration};

use tokio::sync::{Mutex, RwLock, watch};
use tokio::time::timeout;
use tracing::warn;

use crate::{
    config::AppConfig,
    dao::stat_store::StatStore,
    error::ServiceError,
    state::{lifecycle::TrackerPhase, session::TrackerSession},
};

pub use self::lifecycle::{AbortError, ApplyError, Plan, PlanError, PlanId, Snapshot};
pub use self::sse::SseHub;
use self::lifecycle::{TrackerEvent, TrackerLifecycle};

/// Cheaply clonable handle to the shared application state.
pub type SharedState = Arc<AppState>;
/// Upper bound on the persistence work run inside a lifecycle transition.
pub const DEFAULT_TRANSITION_TIMEOUT: Duration = Duration::from_secs(5);

/// Central application state storing the live session, lifecycle machine and
/// database handle.
pub struct AppState {
    stat_store: RwLock<Option<Arc<dyn StatStore>>>,
    sse: SseHub,
    lifecycle: RwLock<TrackerLifecycle>,
    session: RwLock<Option<TrackerSession>>,
    degraded: watch::Sender<bool>,
    transition_gate: Mutex<()>,
    action_gate: Mutex<()>,
    transition_timeout: Option<Duration>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let sse_capacity = config.sse_capacity();
        Arc::new(Self {
            stat_store: RwLock::new(None),
            sse: SseHub::new(sse_capacity),
            lifecycle: RwLock::new(TrackerLifecycle::new()),
            session: RwLock::new(None),
            degraded: degraded_tx,
            transition_gate: Mutex::new(()),
            action_gate: Mutex::new(()),
            transition_timeout: Some(DEFAULT_TRANSITION_TIMEOUT),
            config,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current statistics store, if one is installed.
    pub async fn stat_store(&self) -> Option<Arc<dyn StatStore>> {
        let guard = self.stat_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the current statistics store or fail when running degraded.
    pub async fn require_stat_store(&self) -> Result<Arc<dyn StatStore>, ServiceError> {
        self.stat_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new statistics store implementation and leave degraded mode.
    pub async fn install_stat_store(&self, store: Arc<dyn StatStore>) {
        {
            let mut guard = self.stat_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current statistics store and enter degraded mode.
    pub async fn clear_stat_store(&self) {
        {
            let mut guard = self.stat_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.stat_store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Broadcast hub used for the live SSE stream.
    pub fn live_sse(&self) -> &SseHub {
        &self.sse
    }

    /// Snapshot the current phase of the shared lifecycle machine.
    pub async fn lifecycle_phase(&self) -> TrackerPhase {
        self.lifecycle.read().await.phase()
    }

    /// Currently open live session data.
    pub fn session(&self) -> &RwLock<Option<TrackerSession>> {
        &self.session
    }

    /// Mutex serialising action recording so that event append, counter
    /// increment and scoreboard update happen as one unit.
    pub fn action_gate(&self) -> &Mutex<()> {
        &self.action_gate
    }

    /// Update and broadcast the degraded flag when the value changes.
    async fn update_degraded(&self, value: bool) {
        if *self.degraded.borrow() == value {
            return;
        }

        let _ = self.degraded.send(value);
    }

    /// Plan a transition on the shared lifecycle machine, returning the plan.
    async fn plan_transition(&self, event: TrackerEvent) -> Result<Plan, PlanError> {
        let mut machine = self.lifecycle.write().await;
        machine.plan(event)
    }

    /// Apply the planned transition, returning the next phase.
    async fn apply_planned_transition(&self, plan_id: PlanId) -> Result<TrackerPhase, ApplyError> {
        let mut machine = self.lifecycle.write().await;
        machine.apply(plan_id)
    }

    /// Abort a planned transition of the shared lifecycle machine.
    async fn abort_transition(&self, plan_id: PlanId) -> Result<(), AbortError> {
        let mut machine = self.lifecycle.write().await;
        machine.abort(plan_id)
    }

    /// Snapshot of the lifecycle machine, including any pending transition.
    pub async fn snapshot(&self) -> Snapshot {
        let machine = self.lifecycle.read().await;
        machine.snapshot()
    }

    /// Run `work` inside a planned lifecycle transition: the plan is applied
    /// when the work succeeds and aborted when it fails or times out.
    pub async fn run_transition<F, Fut, T>(
        &self,
        event: TrackerEvent,
        work: F,
    ) -> Result<(T, TrackerPhase), ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, ServiceError>>,
    {
        let gate = self.transition_gate.lock().await;
        let Plan { id: plan_id, .. } = self.plan_transition(event).await?;

        let work_future = work();
        let outcome = if let Some(limit) = self.transition_timeout {
            match timeout(limit, work_future).await {
                Ok(result) => result,
                Err(_) => {
                    if let Err(abort_err) = self.abort_transition(plan_id).await {
                        warn!(
                            event = ?event,
                            plan_id = %plan_id,
                            error = ?abort_err,
                            "failed to abort transition after timeout"
                        );
                    }
                    drop(gate);
                    return Err(ServiceError::Timeout);
                }
            }
        } else {
            work_future.await
        };

        match outcome {
            Ok(value) => {
                let next = self.apply_planned_transition(plan_id).await?;
                drop(gate);
                Ok((value, next))
            }
            Err(err) => {
                if let Err(abort_err) = self.abort_transition(plan_id).await {
                    warn!(
                        event = ?event,
                        plan_id = %plan_id,
                        error = ?abort_err,
                        "failed to abort transition after work error"
                    );
                }
                drop(gate);
                Err(err)
            }
        }
    }
}
