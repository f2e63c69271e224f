mod config;
mod error;
mod models;
mod store;

pub use config::CouchConfig;
pub use error::{CouchDaoError, CouchResult};
pub use store::CouchHistoryStore;

use crate::dao::storage::StorageError;

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        match err {
            CouchDaoError::ForeignDocument { doc_id, reason } => StorageError::Malformed {
                record: doc_id,
                reason: reason.to_string(),
            },
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
