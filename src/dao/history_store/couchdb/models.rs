use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    dao::{history_store::couchdb::error::CouchDaoError, models::CompletedConnectionEntity},
    state::game::{Node, SeedMovie},
};

pub const CONNECTION_PREFIX: &str = "connection::";

/// One page of the Mango query listing an account's records.
#[derive(Debug, Serialize)]
pub struct FindRequest<'a> {
    pub selector: AccountSelector<'a>,
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct AccountSelector<'a> {
    pub account_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct FindResponse {
    pub docs: Vec<CouchConnectionDocument>,
    #[serde(default)]
    pub bookmark: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchConnectionDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub body: ConnectionBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionBody {
    pub account_id: String,
    pub seed_a: SeedMovie,
    pub seed_b: SeedMovie,
    pub path: Vec<Node>,
    pub path_length: u32,
    pub completed_at: SystemTime,
}

impl From<CompletedConnectionEntity> for CouchConnectionDocument {
    fn from(entity: CompletedConnectionEntity) -> Self {
        Self {
            id: connection_doc_id(entity.id),
            rev: None,
            body: ConnectionBody {
                account_id: entity.account_id,
                seed_a: entity.seed_a,
                seed_b: entity.seed_b,
                path: entity.path,
                path_length: entity.path_length,
                completed_at: entity.completed_at,
            },
        }
    }
}

impl TryFrom<CouchConnectionDocument> for CompletedConnectionEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchConnectionDocument) -> Result<Self, Self::Error> {
        let id = parse_connection_id(&doc.id)?;
        let body = doc.body;
        Ok(Self {
            id,
            account_id: body.account_id,
            seed_a: body.seed_a,
            seed_b: body.seed_b,
            path: body.path,
            path_length: body.path_length,
            completed_at: body.completed_at,
        })
    }
}

pub fn connection_doc_id(id: Uuid) -> String {
    format!("{CONNECTION_PREFIX}{id}")
}

pub fn parse_connection_id(doc_id: &str) -> Result<Uuid, CouchDaoError> {
    let raw = doc_id
        .strip_prefix(CONNECTION_PREFIX)
        .ok_or_else(|| CouchDaoError::ForeignDocument {
            doc_id: doc_id.to_string(),
            reason: "missing connection prefix",
        })?;
    Uuid::parse_str(raw).map_err(|_| CouchDaoError::ForeignDocument {
        doc_id: doc_id.to_string(),
        reason: "invalid uuid",
    })
}
