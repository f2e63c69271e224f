use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MongoDaoError;
use crate::{
    dao::models::CompletedConnectionEntity,
    state::game::{Node, SeedMovie},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConnectionDocument {
    #[serde(rename = "_id")]
    id: Binary,
    account_id: String,
    seed_a: SeedMovie,
    seed_b: SeedMovie,
    path: Vec<Node>,
    path_length: u32,
    completed_at: DateTime,
}

impl From<CompletedConnectionEntity> for MongoConnectionDocument {
    fn from(value: CompletedConnectionEntity) -> Self {
        Self {
            id: uuid_as_binary(value.id),
            account_id: value.account_id,
            seed_a: value.seed_a,
            seed_b: value.seed_b,
            path: value.path,
            path_length: value.path_length,
            completed_at: DateTime::from_system_time(value.completed_at),
        }
    }
}

impl TryFrom<MongoConnectionDocument> for CompletedConnectionEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoConnectionDocument) -> Result<Self, Self::Error> {
        let id = Uuid::from_slice(&value.id.bytes).map_err(|_| MongoDaoError::InvalidRecordId {
            record: format!("{:?}", value.id.bytes),
        })?;

        Ok(Self {
            id,
            account_id: value.account_id,
            seed_a: value.seed_a,
            seed_b: value.seed_b,
            path: value.path,
            path_length: value.path_length,
            completed_at: value.completed_at.to_system_time(),
        })
    }
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::tests::sample_entity;

    #[test]
    fn document_keeps_uuid_identity() {
        let entity = sample_entity("uid-1");
        let doc = MongoConnectionDocument::from(entity.clone());
        assert_eq!(doc.id.subtype, BinarySubtype::Uuid);

        let back = CompletedConnectionEntity::try_from(doc).unwrap();
        assert_eq!(back.id, entity.id);
        assert_eq!(back.path, entity.path);
        assert_eq!(back.path_length, 2);
    }
}
