use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        format_system_time,
        movie::{CandidateSummary, MovieSummary, NodeKindDto, NodeSummary, SideDto},
    },
    state::{
        ActiveRound,
        game::{Frontier, Side},
        state_machine::RoundPhase,
    },
};

/// Payload used to start a round from two seed movies.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartRoundRequest {
    #[validate(range(min = 1, message = "movie_a_id must be a provider identifier"))]
    pub movie_a_id: u64,
    #[validate(range(min = 1, message = "movie_b_id must be a provider identifier"))]
    pub movie_b_id: u64,
}

/// Pick an actor from the cast of the movie anchoring `side`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SelectActorRequest {
    pub side: SideDto,
    #[validate(range(min = 1, message = "actor_id must be a provider identifier"))]
    pub actor_id: u64,
}

/// Pick a movie from the filmography of the actor anchoring `side`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SelectMovieRequest {
    pub side: SideDto,
    #[validate(range(min = 1, message = "movie_id must be a provider identifier"))]
    pub movie_id: u64,
}

/// Lifecycle phase of a round.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhaseDto {
    InProgress,
    Won,
}

impl From<RoundPhase> for RoundPhaseDto {
    fn from(value: RoundPhase) -> Self {
        match value {
            RoundPhase::InProgress => RoundPhaseDto::InProgress,
            RoundPhase::Won => RoundPhaseDto::Won,
        }
    }
}

/// Current anchor of a side and what can be picked from it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FrontierSnapshot {
    pub kind: NodeKindDto,
    pub id: u64,
    pub title: String,
    /// Cast members of a movie anchor, films of an actor anchor.
    pub candidates: Vec<CandidateSummary>,
}

impl From<&Frontier> for FrontierSnapshot {
    fn from(frontier: &Frontier) -> Self {
        let (id, candidates) = match frontier {
            Frontier::Movie { id, cast, .. } => {
                (id.0, cast.iter().map(CandidateSummary::from).collect())
            }
            Frontier::Actor {
                id, filmography, ..
            } => (
                id.0,
                filmography.iter().map(CandidateSummary::from).collect(),
            ),
        };

        Self {
            kind: frontier.kind().into(),
            id,
            title: frontier.title().to_string(),
            candidates,
        }
    }
}

/// Full view of the round an account is playing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoundSnapshot {
    pub round_id: Uuid,
    /// RFC 3339 timestamp of the round start.
    pub started_at: String,
    pub phase: RoundPhaseDto,
    /// Moves made so far; the score once the round is won.
    pub move_count: u32,
    pub seed_a: MovieSummary,
    pub seed_b: MovieSummary,
    pub frontier_a: FrontierSnapshot,
    pub frontier_b: FrontierSnapshot,
    pub path: Vec<NodeSummary>,
}

impl From<&ActiveRound> for RoundSnapshot {
    fn from(round: &ActiveRound) -> Self {
        let state = &round.state;
        Self {
            round_id: round.id,
            started_at: format_system_time(round.started_at),
            phase: state.phase().into(),
            move_count: state.move_count(),
            seed_a: state.seed_a().into(),
            seed_b: state.seed_b().into(),
            frontier_a: state.frontier(Side::A).into(),
            frontier_b: state.frontier(Side::B).into(),
            path: state.path().iter().map(NodeSummary::from).collect(),
        }
    }
}
