use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::CompletedConnectionEntity,
    dto::{
        format_system_time,
        movie::{MovieSummary, NodeSummary},
    },
};

/// Completed connection as exposed to the account owning it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompletedConnectionSummary {
    pub id: Uuid,
    pub seed_a: MovieSummary,
    pub seed_b: MovieSummary,
    /// Moves needed to connect the seeds.
    pub path_length: u32,
    pub path: Vec<NodeSummary>,
    /// RFC 3339 timestamp of the commit.
    pub completed_at: String,
}

impl From<CompletedConnectionEntity> for CompletedConnectionSummary {
    fn from(entity: CompletedConnectionEntity) -> Self {
        Self {
            id: entity.id,
            seed_a: (&entity.seed_a).into(),
            seed_b: (&entity.seed_b).into(),
            path_length: entity.path_length,
            path: entity.path.iter().map(NodeSummary::from).collect(),
            completed_at: format_system_time(entity.completed_at),
        }
    }
}

/// Connections completed by an account, oldest first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub connections: Vec<CompletedConnectionSummary>,
}
