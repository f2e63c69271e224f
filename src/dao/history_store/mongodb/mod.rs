mod config;
mod connection;
mod error;
mod models;
mod store;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoHistoryStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::InvalidRecordId { record } => StorageError::Malformed {
                record,
                reason: "identifier is not a UUID".into(),
            },
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
