use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::game::{CastMember, FilmCredit, Movie, Node, NodeKind, SeedMovie, Side};

/// Frontier a move applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SideDto {
    A,
    B,
}

impl From<SideDto> for Side {
    fn from(value: SideDto) -> Self {
        match value {
            SideDto::A => Side::A,
            SideDto::B => Side::B,
        }
    }
}

impl From<Side> for SideDto {
    fn from(value: Side) -> Self {
        match value {
            Side::A => SideDto::A,
            Side::B => SideDto::B,
        }
    }
}

/// Kind of entity referenced by a path node or a frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NodeKindDto {
    Movie,
    Actor,
}

impl From<NodeKind> for NodeKindDto {
    fn from(value: NodeKind) -> Self {
        match value {
            NodeKind::Movie => NodeKindDto::Movie,
            NodeKind::Actor => NodeKindDto::Actor,
        }
    }
}

/// Movie reference without its cast.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
}

impl From<&Movie> for MovieSummary {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id.0,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
        }
    }
}

impl From<&SeedMovie> for MovieSummary {
    fn from(seed: &SeedMovie) -> Self {
        Self {
            id: seed.id.0,
            title: seed.title.clone(),
            poster_path: seed.poster_path.clone(),
        }
    }
}

/// Two distinct seed movies proposed for a new round.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RandomPairResponse {
    pub movie_a: MovieSummary,
    pub movie_b: MovieSummary,
}

/// Entry a player can pick next: a cast member or a film.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CandidateSummary {
    pub id: u64,
    /// Actor name or movie title.
    pub title: String,
    /// Profile photo for actors, poster for movies.
    pub image: Option<String>,
    /// Release year, only known for films.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
}

impl From<&CastMember> for CandidateSummary {
    fn from(member: &CastMember) -> Self {
        Self {
            id: member.id.0,
            title: member.name.clone(),
            image: member.photo_path.clone(),
            year: None,
        }
    }
}

impl From<&FilmCredit> for CandidateSummary {
    fn from(credit: &FilmCredit) -> Self {
        Self {
            id: credit.id.0,
            title: credit.title.clone(),
            image: credit.poster_path.clone(),
            year: credit.year,
        }
    }
}

/// One step of a connection path.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NodeSummary {
    pub id: u64,
    pub title: String,
    pub kind: NodeKindDto,
    pub side: SideDto,
    pub image: Option<String>,
}

impl From<&Node> for NodeSummary {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            title: node.title.clone(),
            kind: node.kind.into(),
            side: node.side.into(),
            image: node.image.clone(),
        }
    }
}
