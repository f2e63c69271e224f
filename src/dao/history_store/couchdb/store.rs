use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;
use uuid::Uuid;

use crate::dao::{
    history_store::HistoryStore, models::CompletedConnectionEntity, storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        AccountSelector, CouchConnectionDocument, FindRequest, FindResponse, connection_doc_id,
    },
};

/// Documents fetched per Mango `_find` page.
const PAGE_SIZE: usize = 200;

#[derive(Clone)]
pub struct CouchHistoryStore {
    client: Client,
    database_url: Arc<str>,
    credentials: Option<Arc<(String, String)>>,
}

impl CouchHistoryStore {
    /// Establish a connection to CouchDB and ensure the database and its index exist.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            database_url: Arc::from(config.database_url()),
            credentials: config.credentials.map(Arc::new),
        };

        store.ensure_database().await?;
        store.ensure_account_index().await?;
        Ok(store)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.credentials.as_deref() {
            Some((user, pass)) => builder.basic_auth(user, Some(pass)),
            None => builder,
        }
    }

    /// Request against the database itself (`path` empty) or a path below it.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = if path.is_empty() {
            self.database_url.to_string()
        } else {
            format!("{}/{}", self.database_url, path)
        };
        self.authorize(self.client.request(method, url))
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let endpoint = &*self.database_url;
        let response = self
            .request(Method::GET, "")
            .send()
            .await
            .map_err(CouchDaoError::unreachable(endpoint))?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .request(Method::PUT, "")
                    .send()
                    .await
                    .map_err(CouchDaoError::unreachable(endpoint))?;
                // 412 means another instance created it first.
                match create.status() {
                    status if status.is_success() => Ok(()),
                    StatusCode::PRECONDITION_FAILED => Ok(()),
                    status => Err(CouchDaoError::rejected(endpoint, status)),
                }
            }
            other => Err(CouchDaoError::rejected(endpoint, other)),
        }
    }

    async fn ensure_account_index(&self) -> CouchResult<()> {
        const INDEX: &str = "_index";
        let body = json!({
            "index": { "fields": ["account_id"] },
            "name": "account_id_idx",
            "type": "json",
        });

        let response = self
            .request(Method::POST, INDEX)
            .json(&body)
            .send()
            .await
            .map_err(CouchDaoError::unreachable(INDEX))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::rejected(INDEX, response.status()))
        }
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(CouchDaoError::unreachable(doc_id))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response
                    .json::<T>()
                    .await
                    .map(Some)
                    .map_err(|source| CouchDaoError::Decode {
                        endpoint: doc_id.to_string(),
                        source,
                    })
            }
            other => Err(CouchDaoError::rejected(doc_id, other)),
        }
    }

    async fn put_document<T>(&self, doc_id: &str, document: &T) -> CouchResult<()>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .request(Method::PUT, doc_id)
            .json(document)
            .send()
            .await
            .map_err(CouchDaoError::unreachable(doc_id))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::rejected(doc_id, response.status()))
        }
    }

    async fn delete_document(&self, doc_id: &str, rev: &str) -> CouchResult<bool> {
        let response = self
            .request(Method::DELETE, doc_id)
            .query(&[("rev", rev)])
            .send()
            .await
            .map_err(CouchDaoError::unreachable(doc_id))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            other => Err(CouchDaoError::rejected(doc_id, other)),
        }
    }

    async fn find_page(&self, query: &FindRequest<'_>) -> CouchResult<FindResponse> {
        const FIND: &str = "_find";
        let response = self
            .request(Method::POST, FIND)
            .json(query)
            .send()
            .await
            .map_err(CouchDaoError::unreachable(FIND))?;

        if !response.status().is_success() {
            return Err(CouchDaoError::rejected(FIND, response.status()));
        }

        response
            .json::<FindResponse>()
            .await
            .map_err(|source| CouchDaoError::Decode {
                endpoint: FIND.to_string(),
                source,
            })
    }

    /// Every document of the account, following `_find` bookmarks until a
    /// page comes back empty.
    async fn find_by_account(&self, account_id: &str) -> CouchResult<Vec<CouchConnectionDocument>> {
        let mut docs = Vec::new();
        let mut bookmark: Option<String> = None;

        loop {
            let query = FindRequest {
                selector: AccountSelector { account_id },
                limit: PAGE_SIZE,
                bookmark: bookmark.as_deref(),
            };
            let page = self.find_page(&query).await?;
            if page.docs.is_empty() {
                break;
            }
            let last_page = page.docs.len() < PAGE_SIZE;
            docs.extend(page.docs);
            match page.bookmark {
                Some(next) if !last_page => bookmark = Some(next),
                _ => break,
            }
        }

        Ok(docs)
    }
}

impl HistoryStore for CouchHistoryStore {
    fn append(&self, connection: CompletedConnectionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc = CouchConnectionDocument::from(connection);
            store.put_document(&doc.id, &doc).await.map_err(Into::into)
        })
    }

    fn remove(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = connection_doc_id(id);
            let Some(existing) = store
                .get_document::<CouchConnectionDocument>(&doc_id)
                .await?
            else {
                return Ok(false);
            };
            let Some(rev) = existing.rev else {
                return Ok(false);
            };
            store
                .delete_document(&doc_id, &rev)
                .await
                .map_err(Into::into)
        })
    }

    fn find(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<CompletedConnectionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = connection_doc_id(id);
            let maybe_doc = store
                .get_document::<CouchConnectionDocument>(&doc_id)
                .await?;
            match maybe_doc {
                Some(doc) => Ok(Some(doc.try_into()?)),
                None => Ok(None),
            }
        })
    }

    fn list(&self, account_id: &str) -> BoxFuture<'static, StorageResult<Vec<CompletedConnectionEntity>>> {
        let store = self.clone();
        let account_id = account_id.to_string();
        Box::pin(async move {
            let docs = store.find_by_account(&account_id).await?;
            let mut records = docs
                .into_iter()
                .map(CompletedConnectionEntity::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            records.sort_by_key(|record| record.completed_at);
            Ok(records)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let endpoint = &*store.database_url;
            let response = store
                .request(Method::GET, "")
                .send()
                .await
                .map_err(CouchDaoError::unreachable(endpoint))?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::rejected(endpoint, response.status()).into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
