use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, IndexModel, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoConnectionDocument, doc_id},
};
use crate::dao::{
    history_store::HistoryStore, models::CompletedConnectionEntity, storage::StorageResult,
};

const CONNECTION_COLLECTION_NAME: &str = "completed_connections";

#[derive(Clone)]
pub struct MongoHistoryStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
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

impl MongoHistoryStore {
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
        let collection = self.collection().await;
        let index = IndexModel::builder()
            .keys(doc! {"account_id": 1, "completed_at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("connection_account_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: CONNECTION_COLLECTION_NAME,
                index: "account_id,completed_at",
                source,
            })?;

        Ok(())
    }

    async fn collection(&self) -> Collection<MongoConnectionDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoConnectionDocument>(CONNECTION_COLLECTION_NAME)
    }

    async fn append(&self, connection: CompletedConnectionEntity) -> MongoResult<()> {
        let id = connection.id;
        let document: MongoConnectionDocument = connection.into();
        let collection = self.collection().await;
        collection
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::AppendConnection { id, source })?;
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> MongoResult<bool> {
        let collection = self.collection().await;
        let result = collection
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::RemoveConnection { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn find(&self, id: Uuid) -> MongoResult<Option<CompletedConnectionEntity>> {
        let collection = self.collection().await;
        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadConnection { id, source })?;

        document.map(TryInto::try_into).transpose()
    }

    async fn list(&self, account_id: String) -> MongoResult<Vec<CompletedConnectionEntity>> {
        let collection = self.collection().await;
        let documents: Vec<MongoConnectionDocument> = collection
            .find(doc! { "account_id": account_id.as_str() })
            .sort(doc! { "completed_at": 1 })
            .await
            .map_err(|source| MongoDaoError::ListConnections {
                account_id: account_id.clone(),
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListConnections {
                account_id: account_id.clone(),
                source,
            })?;

        documents.into_iter().map(TryInto::try_into).collect()
    }
}

impl HistoryStore for MongoHistoryStore {
    fn append(&self, connection: CompletedConnectionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.append(connection).await.map_err(Into::into) })
    }

    fn remove(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.remove(id).await.map_err(Into::into) })
    }

    fn find(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<CompletedConnectionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find(id).await.map_err(Into::into) })
    }

    fn list(&self, account_id: &str) -> BoxFuture<'static, StorageResult<Vec<CompletedConnectionEntity>>> {
        let store = self.clone();
        let account_id = account_id.to_string();
        Box::pin(async move { store.list(account_id).await.map_err(Into::into) })
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
