#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::court::Branch;
use crate::dao::models::{
    AttitudeDefaultEntity, LineupEntity, MatchEntity, PlayerEntity, StatContext, StatEventEntity,
    TrainingEntity,
};
use crate::dao::storage::StorageResult;
use crate::stats::CounterField;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for roster reads, the event log
/// and the cumulative statistics counters.
pub trait StatStore: Send + Sync {
    /// Club roster, optionally filtered by branch.
    fn list_players(
        &self,
        branch: Option<Branch>,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    /// Load a persisted lineup by id.
    fn find_lineup(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<LineupEntity>>>;
    /// Create the match document a live session feeds.
    fn save_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Create the training attendance document a live session feeds.
    fn save_training(&self, entity: TrainingEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Append one action to the event log.
    fn append_event(&self, event: StatEventEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Add one to a player's cumulative counter in the given context bucket.
    fn increment_counter(
        &self,
        player_id: Uuid,
        context: StatContext,
        field: CounterField,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Flag a match as tracked to completion and record the set totals.
    fn mark_match_completed(
        &self,
        match_id: Uuid,
        sets_local: u16,
        sets_rival: u16,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Attitude grades already persisted for the given training session.
    fn session_attitudes(
        &self,
        session_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AttitudeDefaultEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
