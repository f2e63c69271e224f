use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::state::{
    game::{Node, SeedMovie},
    state_machine::GameState,
};

/// Record of a won round persisted by the history store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletedConnectionEntity {
    /// Stable identifier of the record.
    pub id: Uuid,
    /// Account that completed the connection.
    pub account_id: String,
    /// Seed movie of side A.
    pub seed_a: SeedMovie,
    /// Seed movie of side B.
    pub seed_b: SeedMovie,
    /// Full path walked during the round, seeds included.
    pub path: Vec<Node>,
    /// Number of moves needed to connect the seeds (the score).
    pub path_length: u32,
    /// When the record was committed.
    pub completed_at: SystemTime,
}

impl CompletedConnectionEntity {
    /// Build a record from a won round. Returns `None` while the round is still in progress.
    pub fn from_won_round(account_id: impl Into<String>, state: &GameState) -> Option<Self> {
        if !state.is_won() {
            return None;
        }

        Some(Self {
            id: Uuid::new_v4(),
            account_id: account_id.into(),
            seed_a: state.seed_a().clone(),
            seed_b: state.seed_b().clone(),
            path: state.path().to_vec(),
            path_length: state.move_count(),
            completed_at: SystemTime::now(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::state::{
        game::{ActorId, ActorSelection, CastMember, Movie, MovieId, Side},
        state_machine::ConnectionGameEngine,
    };

    fn seed(id: u64, title: &str) -> Movie {
        Movie {
            id: MovieId(id),
            title: title.into(),
            poster_path: None,
            cast: vec![CastMember {
                id: ActorId(100),
                name: "Robert De Niro".into(),
                photo_path: None,
            }],
        }
    }

    fn de_niro() -> ActorSelection {
        ActorSelection {
            id: ActorId(100),
            name: "Robert De Niro".into(),
            photo_path: None,
            filmography: Vec::new(),
        }
    }

    pub(crate) fn sample_entity(account_id: &str) -> CompletedConnectionEntity {
        let state = ConnectionGameEngine::start_round(seed(1, "Heat"), seed(2, "Ransom")).unwrap();
        let state = ConnectionGameEngine::select_actor(&state, Side::A, de_niro()).unwrap();
        let state = ConnectionGameEngine::select_actor(&state, Side::B, de_niro()).unwrap();
        CompletedConnectionEntity::from_won_round(account_id, &state).unwrap()
    }

    #[test]
    fn in_progress_rounds_are_not_recorded() {
        let state = ConnectionGameEngine::start_round(seed(1, "Heat"), seed(2, "Ransom")).unwrap();
        assert!(CompletedConnectionEntity::from_won_round("uid-1", &state).is_none());
    }

    #[test]
    fn won_round_records_score_and_path() {
        let entity = sample_entity("uid-1");
        assert_eq!(entity.account_id, "uid-1");
        assert_eq!(entity.path_length, 2);
        assert_eq!(entity.path.len(), 4);
        assert_eq!(entity.seed_a.title, "Heat");
    }
}
