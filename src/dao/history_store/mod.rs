#[cfg(feature = "couch-store")]
pub mod couchdb;
/// Process-local store used when no database is configured, and in tests.
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::CompletedConnectionEntity;
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for completed connections.
pub trait HistoryStore: Send + Sync {
    /// Persist a freshly completed connection.
    fn append(&self, connection: CompletedConnectionEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete a record, returning whether it existed.
    fn remove(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Fetch a single record.
    fn find(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<CompletedConnectionEntity>>>;
    /// Every record of an account, oldest first.
    fn list(&self, account_id: &str) -> BoxFuture<'static, StorageResult<Vec<CompletedConnectionEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
