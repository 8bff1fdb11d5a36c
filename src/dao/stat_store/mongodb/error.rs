use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to list players")]
    ListPlayers {
        #[source]
        source: MongoError,
    },
    #[error("failed to load lineup `{id}`")]
    LoadLineup {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to save match `{id}`")]
    SaveMatch {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to save training session `{id}`")]
    SaveTraining {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to append stat event `{id}`")]
    AppendEvent {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to increment counter `{field}` for player `{player_id}`")]
    IncrementCounter {
        player_id: Uuid,
        field: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to mark match `{id}` as completed")]
    CompleteMatch {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load attitude events for session `{session_id}`")]
    LoadSessionAttitudes {
        session_id: Uuid,
        #[source]
        source: MongoError,
    },
}
