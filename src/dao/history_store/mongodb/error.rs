use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
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
    #[error("failed to append completed connection `{id}`")]
    AppendConnection {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to remove completed connection `{id}`")]
    RemoveConnection {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load completed connection `{id}`")]
    LoadConnection {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to list completed connections of `{account_id}`")]
    ListConnections {
        account_id: String,
        #[source]
        source: MongoError,
    },
    #[error("stored completed connection `{record}` has an invalid identifier")]
    InvalidRecordId { record: String },
}
