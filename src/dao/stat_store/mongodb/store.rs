use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use indexmap::IndexMap;
use mongodb::{Client, Collection, Database, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoAttitudeEventDocument, MongoMatchDocument, MongoStatEventDocument,
        MongoTrainingDocument, doc_id, uuid_as_binary,
    },
};
use crate::{
    court::Branch,
    dao::{
        models::{
            AttitudeDefaultEntity, LineupEntity, MatchEntity, PlayerEntity, StatContext,
            StatEventEntity, TrainingEntity,
        },
        stat_store::StatStore,
        storage::StorageResult,
    },
    stats::{Action, CounterField},
};

const PLAYER_COLLECTION_NAME: &str = "players";
const LINEUP_COLLECTION_NAME: &str = "lineups";
const MATCH_COLLECTION_NAME: &str = "matches";
const TRAINING_COLLECTION_NAME: &str = "training_attendance";
const EVENT_COLLECTION_NAME: &str = "stat_events";
const STATS_COLLECTION_NAME: &str = "global_stats";

#[derive(Clone)]
/// MongoDB-backed [`StatStore`] holding a reconnectable client handle.
pub struct MongoStatStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoStatStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let players = database.collection::<mongodb::bson::Document>(PLAYER_COLLECTION_NAME);
        let branch_index = mongodb::IndexModel::builder()
            .keys(doc! {"branch": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("player_branch_idx".to_owned()))
                    .build(),
            )
            .build();
        players
            .create_index(branch_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: PLAYER_COLLECTION_NAME,
                index: "branch",
                source,
            })?;

        // Events are queried per session document and per player.
        let events = database.collection::<mongodb::bson::Document>(EVENT_COLLECTION_NAME);
        let event_index = mongodb::IndexModel::builder()
            .keys(doc! {"context_id": 1, "player_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("event_context_player_idx".to_owned()))
                    .build(),
            )
            .build();
        events
            .create_index(event_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: EVENT_COLLECTION_NAME,
                index: "context_id,player_id",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn player_collection(&self) -> Collection<PlayerEntity> {
        self.database()
            .await
            .collection::<PlayerEntity>(PLAYER_COLLECTION_NAME)
    }

    async fn lineup_collection(&self) -> Collection<LineupEntity> {
        self.database()
            .await
            .collection::<LineupEntity>(LINEUP_COLLECTION_NAME)
    }

    async fn match_collection(&self) -> Collection<MongoMatchDocument> {
        self.database()
            .await
            .collection::<MongoMatchDocument>(MATCH_COLLECTION_NAME)
    }

    async fn training_collection(&self) -> Collection<MongoTrainingDocument> {
        self.database()
            .await
            .collection::<MongoTrainingDocument>(TRAINING_COLLECTION_NAME)
    }

    async fn event_collection(&self) -> Collection<MongoStatEventDocument> {
        self.database()
            .await
            .collection::<MongoStatEventDocument>(EVENT_COLLECTION_NAME)
    }

    async fn list_players(&self, branch: Option<Branch>) -> MongoResult<Vec<PlayerEntity>> {
        let collection = self.player_collection().await;
        let filter = match branch {
            Some(Branch::Male) => doc! {"branch": "male"},
            Some(Branch::Female) => doc! {"branch": "female"},
            None => doc! {},
        };

        collection
            .find(filter)
            .await
            .map_err(|source| MongoDaoError::ListPlayers { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListPlayers { source })
    }

    async fn find_lineup(&self, id: Uuid) -> MongoResult<Option<LineupEntity>> {
        let collection = self.lineup_collection().await;
        collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadLineup { id, source })
    }

    async fn save_match(&self, entity: MatchEntity) -> MongoResult<()> {
        let id = entity.id;
        let document: MongoMatchDocument = entity.into();
        self.match_collection()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveMatch { id, source })?;
        Ok(())
    }

    async fn save_training(&self, entity: TrainingEntity) -> MongoResult<()> {
        let id = entity.id;
        let document: MongoTrainingDocument = entity.into();
        self.training_collection()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveTraining { id, source })?;
        Ok(())
    }

    async fn append_event(&self, event: StatEventEntity) -> MongoResult<()> {
        let id = event.id;
        let document: MongoStatEventDocument = event.into();
        self.event_collection()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::AppendEvent { id, source })?;
        Ok(())
    }

    async fn increment_counter(
        &self,
        player_id: Uuid,
        context: StatContext,
        field: CounterField,
    ) -> MongoResult<()> {
        let key = format!("{}.{}", context.field_prefix(), field.as_str());
        let collection = self
            .database()
            .await
            .collection::<mongodb::bson::Document>(STATS_COLLECTION_NAME);

        collection
            .update_one(doc_id(player_id), doc! {"$inc": {key: 1_i64}})
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::IncrementCounter {
                player_id,
                field: field.as_str(),
                source,
            })?;
        Ok(())
    }

    async fn mark_match_completed(
        &self,
        match_id: Uuid,
        sets_local: u16,
        sets_rival: u16,
    ) -> MongoResult<()> {
        self.match_collection()
            .await
            .update_one(
                doc_id(match_id),
                doc! {"$set": {
                    "completed": true,
                    "sets_local": sets_local as i32,
                    "sets_rival": sets_rival as i32,
                }},
            )
            .await
            .map_err(|source| MongoDaoError::CompleteMatch {
                id: match_id,
                source,
            })?;
        Ok(())
    }

    async fn session_attitudes(&self, session_id: Uuid) -> MongoResult<Vec<AttitudeDefaultEntity>> {
        let collection = self
            .database()
            .await
            .collection::<MongoAttitudeEventDocument>(EVENT_COLLECTION_NAME);

        let documents: Vec<MongoAttitudeEventDocument> = collection
            .find(doc! {
                "context_id": uuid_as_binary(session_id),
                "category": "attitude",
            })
            .await
            .map_err(|source| MongoDaoError::LoadSessionAttitudes { session_id, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadSessionAttitudes { session_id, source })?;

        Ok(latest_attitudes(documents))
    }
}

/// Reduce a session's attitude events to one grade per player, the most
/// recently recorded one winning.
fn latest_attitudes(mut events: Vec<MongoAttitudeEventDocument>) -> Vec<AttitudeDefaultEntity> {
    events.sort_by_key(|event| event.recorded_at);
    let mut latest: IndexMap<Uuid, AttitudeDefaultEntity> = IndexMap::new();
    for event in events {
        if let Action::Attitude(grade) = event.action {
            latest.insert(
                event.player_id,
                AttitudeDefaultEntity {
                    player_id: event.player_id,
                    grade,
                },
            );
        }
    }
    latest.into_values().collect()
}

impl StatStore for MongoStatStore {
    fn list_players(
        &self,
        branch: Option<Branch>,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_players(branch).await.map_err(Into::into) })
    }

    fn find_lineup(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<LineupEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_lineup(id).await.map_err(Into::into) })
    }

    fn save_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_match(entity).await.map_err(Into::into) })
    }

    fn save_training(&self, entity: TrainingEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_training(entity).await.map_err(Into::into) })
    }

    fn append_event(&self, event: StatEventEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.append_event(event).await.map_err(Into::into) })
    }

    fn increment_counter(
        &self,
        player_id: Uuid,
        context: StatContext,
        field: CounterField,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .increment_counter(player_id, context, field)
                .await
                .map_err(Into::into)
        })
    }

    fn mark_match_completed(
        &self,
        match_id: Uuid,
        sets_local: u16,
        sets_rival: u16,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .mark_match_completed(match_id, sets_local, sets_rival)
                .await
                .map_err(Into::into)
        })
    }

    fn session_attitudes(
        &self,
        session_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AttitudeDefaultEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.session_attitudes(session_id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::AttitudeGrade;
    use mongodb::bson::DateTime;

    fn attitude_event(player_id: Uuid, grade: AttitudeGrade, millis: i64) -> MongoAttitudeEventDocument {
        MongoAttitudeEventDocument {
            player_id,
            action: Action::Attitude(grade),
            recorded_at: DateTime::from_millis(millis),
        }
    }

    #[test]
    fn latest_attitude_per_player_wins() {
        let player = Uuid::new_v4();
        let other = Uuid::new_v4();
        let events = vec![
            attitude_event(player, AttitudeGrade::Regular, 2_000),
            attitude_event(other, AttitudeGrade::Perfect, 1_000),
            attitude_event(player, AttitudeGrade::Bad, 1_000),
        ];

        let defaults = latest_attitudes(events);
        assert_eq!(defaults.len(), 2);
        let for_player = defaults.iter().find(|d| d.player_id == player).unwrap();
        assert_eq!(for_player.grade, AttitudeGrade::Regular);
    }

    #[test]
    fn non_attitude_events_are_ignored() {
        let events = vec![MongoAttitudeEventDocument {
            player_id: Uuid::new_v4(),
            action: Action::Serve(crate::stats::ServeResult::Ace),
            recorded_at: DateTime::from_millis(1_000),
        }];
        assert!(latest_attitudes(events).is_empty());
    }
}
