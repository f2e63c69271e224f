use thiserror::Error;

use crate::state::game::{
    ActorSelection, Frontier, Movie, MovieSelection, Node, NodeKind, SeedMovie, Side,
};

/// Phases a round can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Both frontiers can still be advanced.
    InProgress,
    /// The frontiers converged; the round accepts no further moves.
    Won,
}

/// Reasons a seed movie is rejected by [`ConnectionGameEngine::start_round`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedDefect {
    /// The seed has no provider identifier.
    MissingId,
    /// The seed has an empty title.
    MissingTitle,
}

/// Reasons a selection is rejected by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionDefect {
    /// The selected entity has no provider identifier.
    MissingId,
    /// The side's frontier is not anchored on the kind the selection needs.
    WrongFrontier {
        /// Kind the frontier must be anchored on.
        expected: NodeKind,
        /// Kind the frontier is actually anchored on.
        actual: NodeKind,
    },
}

/// Errors raised by the connection engine. Rejected operations leave the
/// input state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A seed movie is malformed.
    #[error("invalid seed for side {side}: {defect:?}")]
    InvalidSeed {
        /// Side the malformed seed was meant for.
        side: Side,
        /// What is wrong with it.
        defect: SeedDefect,
    },
    /// A move was attempted after the frontiers converged.
    #[error("round is already won; no further moves are accepted")]
    StateTerminated,
    /// The selection cannot be applied to the side's current frontier.
    #[error("invalid selection on side {side}: {defect:?}")]
    InvalidSelection {
        /// Side the selection was made on.
        side: Side,
        /// What is wrong with it.
        defect: SelectionDefect,
    },
}

/// Complete state of one connection round.
///
/// Values are only produced by [`ConnectionGameEngine`]; the path is
/// append-only and always starts with the two seed movies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    seed_a: SeedMovie,
    seed_b: SeedMovie,
    frontier_a: Frontier,
    frontier_b: Frontier,
    path: Vec<Node>,
    move_count: u32,
    won: bool,
}

impl GameState {
    /// Seed movie of side A.
    pub fn seed_a(&self) -> &SeedMovie {
        &self.seed_a
    }

    /// Seed movie of side B.
    pub fn seed_b(&self) -> &SeedMovie {
        &self.seed_b
    }

    /// Current frontier of the given side.
    pub fn frontier(&self, side: Side) -> &Frontier {
        match side {
            Side::A => &self.frontier_a,
            Side::B => &self.frontier_b,
        }
    }

    /// Every node visited so far, seeds included.
    pub fn path(&self) -> &[Node] {
        &self.path
    }

    /// Number of moves after the two seeds. This is the player's score.
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Whether the frontiers have converged.
    pub fn is_won(&self) -> bool {
        self.won
    }

    /// Current phase derived from the win flag.
    pub fn phase(&self) -> RoundPhase {
        if self.won {
            RoundPhase::Won
        } else {
            RoundPhase::InProgress
        }
    }

    fn frontier_mut(&mut self, side: Side) -> &mut Frontier {
        match side {
            Side::A => &mut self.frontier_a,
            Side::B => &mut self.frontier_b,
        }
    }

    fn ensure_in_progress(&self) -> Result<(), EngineError> {
        if self.won {
            return Err(EngineError::StateTerminated);
        }
        Ok(())
    }

    fn ensure_frontier(&self, side: Side, expected: NodeKind) -> Result<(), EngineError> {
        let actual = self.frontier(side).kind();
        if actual != expected {
            return Err(EngineError::InvalidSelection {
                side,
                defect: SelectionDefect::WrongFrontier { expected, actual },
            });
        }
        Ok(())
    }

    /// Install the new anchor, record the node, and re-run the win check.
    fn advance(mut self, side: Side, frontier: Frontier, node: Node) -> Self {
        *self.frontier_mut(side) = frontier;
        self.path.push(node);
        self.move_count += 1;
        self.won = ConnectionGameEngine::evaluate_win(&self);
        self
    }
}

/// Rules for building a connection between two seed movies.
///
/// The engine performs no I/O: callers resolve cast lists and filmographies
/// before invoking it, and every operation returns the next state without
/// modifying the one it was given.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionGameEngine;

impl ConnectionGameEngine {
    /// Start a round from two seed movies with their cast lists resolved.
    pub fn start_round(seed_a: Movie, seed_b: Movie) -> Result<GameState, EngineError> {
        validate_seed(Side::A, &seed_a)?;
        validate_seed(Side::B, &seed_b)?;

        let path = vec![seed_node(Side::A, &seed_a), seed_node(Side::B, &seed_b)];
        let seed_a_ref = SeedMovie::from(&seed_a);
        let seed_b_ref = SeedMovie::from(&seed_b);

        let mut state = GameState {
            seed_a: seed_a_ref,
            seed_b: seed_b_ref,
            frontier_a: seed_a.into(),
            frontier_b: seed_b.into(),
            path,
            move_count: 0,
            won: false,
        };
        state.won = Self::evaluate_win(&state);
        Ok(state)
    }

    /// Advance `side` from its movie anchor to one of that movie's actors.
    ///
    /// The engine does not check that the actor belongs to the current cast.
    pub fn select_actor(
        state: &GameState,
        side: Side,
        actor: ActorSelection,
    ) -> Result<GameState, EngineError> {
        state.ensure_in_progress()?;
        if !actor.id.is_set() {
            return Err(EngineError::InvalidSelection {
                side,
                defect: SelectionDefect::MissingId,
            });
        }
        state.ensure_frontier(side, NodeKind::Movie)?;

        let node = Node {
            id: actor.id.0,
            title: actor.name.clone(),
            kind: NodeKind::Actor,
            side,
            image: actor.photo_path,
        };
        let frontier = Frontier::Actor {
            id: actor.id,
            name: actor.name,
            filmography: actor.filmography,
        };

        Ok(state.clone().advance(side, frontier, node))
    }

    /// Advance `side` from its actor anchor to one of that actor's movies.
    ///
    /// The engine does not check that the movie belongs to the filmography.
    pub fn select_movie(
        state: &GameState,
        side: Side,
        movie: MovieSelection,
    ) -> Result<GameState, EngineError> {
        state.ensure_in_progress()?;
        if !movie.id.is_set() {
            return Err(EngineError::InvalidSelection {
                side,
                defect: SelectionDefect::MissingId,
            });
        }
        state.ensure_frontier(side, NodeKind::Actor)?;

        let node = Node {
            id: movie.id.0,
            title: movie.title.clone(),
            kind: NodeKind::Movie,
            side,
            image: movie.poster_path,
        };
        let frontier = Frontier::Movie {
            id: movie.id,
            title: movie.title,
            cast: movie.cast,
        };

        Ok(state.clone().advance(side, frontier, node))
    }

    /// Whether both frontiers reference the same movie or the same actor.
    pub fn evaluate_win(state: &GameState) -> bool {
        state.frontier_a.same_entity(&state.frontier_b)
    }
}

fn validate_seed(side: Side, seed: &Movie) -> Result<(), EngineError> {
    if !seed.id.is_set() {
        return Err(EngineError::InvalidSeed {
            side,
            defect: SeedDefect::MissingId,
        });
    }
    if seed.title.trim().is_empty() {
        return Err(EngineError::InvalidSeed {
            side,
            defect: SeedDefect::MissingTitle,
        });
    }
    Ok(())
}

fn seed_node(side: Side, seed: &Movie) -> Node {
    Node {
        id: seed.id.0,
        title: seed.title.clone(),
        kind: NodeKind::Movie,
        side,
        image: seed.poster_path.clone(),
    }
}
