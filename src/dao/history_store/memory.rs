use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    history_store::HistoryStore, models::CompletedConnectionEntity, storage::StorageResult,
};

/// History store keeping records in a concurrent map for the lifetime of the process.
#[derive(Clone, Default)]
pub struct InMemoryHistoryStore {
    records: Arc<DashMap<Uuid, CompletedConnectionEntity>>,
}

impl InMemoryHistoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all accounts.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record is stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn append(&self, connection: CompletedConnectionEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.records.insert(connection.id, connection);
        Box::pin(async { Ok(()) })
    }

    fn remove(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let removed = self.records.remove(&id).is_some();
        Box::pin(async move { Ok(removed) })
    }

    fn find(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<CompletedConnectionEntity>>> {
        let found = self.records.get(&id).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(found) })
    }

    fn list(&self, account_id: &str) -> BoxFuture<'static, StorageResult<Vec<CompletedConnectionEntity>>> {
        let mut records = self
            .records
            .iter()
            .filter(|entry| entry.account_id == account_id)
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        records.sort_by_key(|record| record.completed_at);
        Box::pin(async move { Ok(records) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::tests::sample_entity;

    #[tokio::test]
    async fn records_are_listed_per_account() {
        let store = InMemoryHistoryStore::new();
        store.append(sample_entity("uid-1")).await.unwrap();
        store.append(sample_entity("uid-1")).await.unwrap();
        store.append(sample_entity("uid-2")).await.unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.list("uid-1").await.unwrap().len(), 2);
        assert_eq!(store.list("uid-2").await.unwrap().len(), 1);
        assert!(store.list("uid-3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_reports_whether_record_existed() {
        let store = InMemoryHistoryStore::new();
        let record = sample_entity("uid-1");
        let id = record.id;
        store.append(record.clone()).await.unwrap();

        assert_eq!(store.find(id).await.unwrap(), Some(record));
        assert!(store.remove(id).await.unwrap());
        assert!(!store.remove(id).await.unwrap());
        assert!(store.find(id).await.unwrap().is_none());
        assert!(store.is_empty());
    }
}
