use std::fmt;

use serde::{Deserialize, Serialize};

/// Provider-scoped identifier of a movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub u64);

/// Provider-scoped identifier of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u64);

impl MovieId {
    /// Whether the identifier carries a value. The provider never issues `0`.
    pub fn is_set(self) -> bool {
        self.0 != 0
    }
}

impl ActorId {
    /// Whether the identifier carries a value. The provider never issues `0`.
    pub fn is_set(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which frontier of the round a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The frontier growing out of the first seed movie.
    A,
    /// The frontier growing out of the second seed movie.
    B,
}

impl Side {
    /// The opposite frontier.
    pub fn other(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

/// Kind of entity a node or frontier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A film.
    Movie,
    /// A cast member.
    Actor,
}

/// One step of the connection path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Provider identifier of the movie or actor.
    pub id: u64,
    /// Movie title or actor name.
    pub title: String,
    pub kind: NodeKind,
    /// Frontier that produced this node.
    pub side: Side,
    /// Poster path for movies, profile photo path for actors.
    pub image: Option<String>,
}

/// Member of a movie's cast as returned by the metadata provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: ActorId,
    pub name: String,
    pub photo_path: Option<String>,
}

/// Entry of an actor's filmography as returned by the metadata provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmCredit {
    pub id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
    /// Release year, when the provider knows it.
    pub year: Option<u16>,
}

/// Movie with its bounded cast list, used to seed a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
    pub cast: Vec<CastMember>,
}

/// Lightweight reference to a seed movie kept on the game state and in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedMovie {
    pub id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
}

impl From<&Movie> for SeedMovie {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
        }
    }
}

/// Actor picked by a player, together with the filmography that becomes the
/// next set of candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorSelection {
    pub id: ActorId,
    pub name: String,
    pub photo_path: Option<String>,
    pub filmography: Vec<FilmCredit>,
}

/// Movie picked by a player, together with the cast that becomes the next set
/// of candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieSelection {
    pub id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
    pub cast: Vec<CastMember>,
}

impl From<Movie> for MovieSelection {
    fn from(movie: Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title,
            poster_path: movie.poster_path,
            cast: movie.cast,
        }
    }
}

/// Current anchor of one side, with the candidates a player can browse next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frontier {
    /// Anchored on a movie; candidates are its cast.
    Movie {
        id: MovieId,
        title: String,
        cast: Vec<CastMember>,
    },
    /// Anchored on an actor; candidates are their films.
    Actor {
        id: ActorId,
        name: String,
        filmography: Vec<FilmCredit>,
    },
}

impl Frontier {
    /// Kind of entity the frontier is anchored on.
    pub fn kind(&self) -> NodeKind {
        match self {
            Frontier::Movie { .. } => NodeKind::Movie,
            Frontier::Actor { .. } => NodeKind::Actor,
        }
    }

    /// Display title of the anchor.
    pub fn title(&self) -> &str {
        match self {
            Frontier::Movie { title, .. } => title,
            Frontier::Actor { name, .. } => name,
        }
    }

    /// Find a cast member among the candidates of a movie anchor.
    pub fn cast_member(&self, actor_id: ActorId) -> Option<&CastMember> {
        match self {
            Frontier::Movie { cast, .. } => cast.iter().find(|member| member.id == actor_id),
            Frontier::Actor { .. } => None,
        }
    }

    /// Find a film among the candidates of an actor anchor.
    pub fn film(&self, movie_id: MovieId) -> Option<&FilmCredit> {
        match self {
            Frontier::Actor { filmography, .. } => {
                filmography.iter().find(|credit| credit.id == movie_id)
            }
            Frontier::Movie { .. } => None,
        }
    }

    /// Whether two anchors reference the same entity.
    pub fn same_entity(&self, other: &Frontier) -> bool {
        match (self, other) {
            (Frontier::Movie { id: left, .. }, Frontier::Movie { id: right, .. }) => left == right,
            (Frontier::Actor { id: left, .. }, Frontier::Actor { id: right, .. }) => left == right,
            _ => false,
        }
    }
}

impl From<Movie> for Frontier {
    fn from(movie: Movie) -> Self {
        Frontier::Movie {
            id: movie.id,
            title: movie.title,
            cast: movie.cast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie_frontier(id: u64) -> Frontier {
        Frontier::Movie {
            id: MovieId(id),
            title: format!("movie {id}"),
            cast: vec![CastMember {
                id: ActorId(7),
                name: "Val Kilmer".into(),
                photo_path: None,
            }],
        }
    }

    #[test]
    fn same_entity_requires_matching_kind() {
        let movie = movie_frontier(7);
        let actor = Frontier::Actor {
            id: ActorId(7),
            name: "Val Kilmer".into(),
            filmography: Vec::new(),
        };

        assert!(movie.same_entity(&movie_frontier(7)));
        assert!(!movie.same_entity(&movie_frontier(8)));
        assert!(!movie.same_entity(&actor));
        assert!(!actor.same_entity(&movie));
    }

    #[test]
    fn candidate_lookup_depends_on_anchor_kind() {
        let movie = movie_frontier(1);
        assert!(movie.cast_member(ActorId(7)).is_some());
        assert!(movie.cast_member(ActorId(8)).is_none());
        assert!(movie.film(MovieId(1)).is_none());
    }

    #[test]
    fn side_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Side::A).unwrap(), "\"A\"");
        assert_eq!(Side::B.other(), Side::A);
    }
}
