//! Movie metadata lookups consumed by the round service.
//!
//! Providers return already-shaped data: cast lists are truncated to the
//! configured limit and ordered by billing, filmographies are ordered newest
//! first with undated films last. The connection engine never talks to a
//! provider directly.

/// Offline catalog backed by a JSON file.
pub mod catalog;
#[cfg(feature = "tmdb")]
pub mod tmdb;

use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::state::game::{ActorId, CastMember, FilmCredit, Movie, MovieId};

/// Result alias for metadata lookups.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Error raised by metadata providers regardless of the backing service.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested movie does not exist.
    #[error("movie `{0}` not found")]
    MovieNotFound(MovieId),
    /// The requested actor does not exist.
    #[error("actor `{0}` not found")]
    ActorNotFound(ActorId),
    /// The provider has nothing to pick a random movie from.
    #[error("no movies available")]
    NoMovies,
    /// The backing service failed.
    #[error("metadata provider unavailable: {message}")]
    Unavailable {
        /// Human readable context.
        message: String,
        /// Backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl ProviderError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        ProviderError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// Bounds applied by providers to the lists they return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderLimits {
    /// Maximum number of cast members per movie.
    pub cast_limit: usize,
    /// Maximum number of films per actor, if any.
    pub filmography_limit: Option<usize>,
}

impl ProviderLimits {
    /// Truncate a cast list to the configured size.
    pub fn limit_cast(&self, mut cast: Vec<CastMember>) -> Vec<CastMember> {
        cast.truncate(self.cast_limit);
        cast
    }

    /// Order a filmography by release year, newest first and undated films
    /// last, then truncate it when a limit is configured. Films from the same
    /// year keep the provider's order.
    pub fn arrange_filmography(&self, mut filmography: Vec<FilmCredit>) -> Vec<FilmCredit> {
        filmography.sort_by(|a, b| b.year.cmp(&a.year));
        if let Some(limit) = self.filmography_limit {
            filmography.truncate(limit);
        }
        filmography
    }
}

impl Default for ProviderLimits {
    fn default() -> Self {
        Self {
            cast_limit: 10,
            filmography_limit: None,
        }
    }
}

/// Abstraction over the movie database used to resolve candidates.
pub trait MetadataProvider: Send + Sync {
    /// Movie details with its bounded cast list.
    fn movie(&self, id: MovieId) -> BoxFuture<'static, ProviderResult<Movie>>;
    /// Bounded, billing-ordered cast of a movie.
    fn cast(&self, id: MovieId) -> BoxFuture<'static, ProviderResult<Vec<CastMember>>>;
    /// Films an actor appeared in.
    fn filmography(&self, id: ActorId) -> BoxFuture<'static, ProviderResult<Vec<FilmCredit>>>;
    /// A random movie with its cast, used to propose seed pairs.
    fn random_movie(&self) -> BoxFuture<'static, ProviderResult<Movie>>;
}
