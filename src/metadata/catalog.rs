use std::{fs, io, path::Path, sync::Arc};

use futures::future::BoxFuture;
use rand::{rng, seq::IndexedRandom};
use serde::Deserialize;
use thiserror::Error;

use super::{MetadataProvider, ProviderError, ProviderLimits, ProviderResult};
use crate::state::game::{ActorId, CastMember, FilmCredit, Movie, MovieId};

/// Failures while loading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The file could not be read.
    #[error("failed to read catalog `{path}`")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    /// The file is not a valid catalog document.
    #[error("failed to parse catalog `{path}`")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogDocument {
    movies: Vec<CatalogMovie>,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogMovie {
    id: MovieId,
    title: String,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    year: Option<u16>,
    #[serde(default)]
    cast: Vec<CastMember>,
}

/// In-memory movie catalog serving the [`MetadataProvider`] contract.
///
/// Filmographies are derived from the cast lists.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    movies: Arc<Vec<CatalogMovie>>,
    limits: ProviderLimits,
}

impl StaticCatalog {
    /// Parse a catalog from its JSON representation.
    pub fn from_json(contents: &str, limits: ProviderLimits) -> Result<Self, serde_json::Error> {
        let document = serde_json::from_str::<CatalogDocument>(contents)?;
        Ok(Self {
            movies: Arc::new(document.movies),
            limits,
        })
    }

    /// Read and parse a catalog file.
    pub fn load(path: &Path, limits: ProviderLimits) -> Result<Self, CatalogError> {
        let display = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&contents, limits).map_err(|source| CatalogError::Parse {
            path: display,
            source,
        })
    }

    /// Catalog without any movie.
    pub fn empty(limits: ProviderLimits) -> Self {
        Self {
            movies: Arc::new(Vec::new()),
            limits,
        }
    }

    /// Number of movies in the catalog.
    pub fn len(&self) -> usize {
        self.movies.len()
    }

    /// Whether the catalog holds no movie.
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    fn find(&self, id: MovieId) -> ProviderResult<&CatalogMovie> {
        self.movies
            .iter()
            .find(|movie| movie.id == id)
            .ok_or(ProviderError::MovieNotFound(id))
    }

    fn to_movie(&self, entry: &CatalogMovie) -> Movie {
        Movie {
            id: entry.id,
            title: entry.title.clone(),
            poster_path: entry.poster_path.clone(),
            cast: self.limits.limit_cast(entry.cast.clone()),
        }
    }

    fn lookup_filmography(&self, id: ActorId) -> ProviderResult<Vec<FilmCredit>> {
        let credits = self
            .movies
            .iter()
            .filter(|movie| movie.cast.iter().any(|member| member.id == id))
            .map(|movie| FilmCredit {
                id: movie.id,
                title: movie.title.clone(),
                poster_path: movie.poster_path.clone(),
                year: movie.year,
            })
            .collect::<Vec<_>>();

        if credits.is_empty() {
            return Err(ProviderError::ActorNotFound(id));
        }
        Ok(self.limits.arrange_filmography(credits))
    }
}

impl MetadataProvider for StaticCatalog {
    fn movie(&self, id: MovieId) -> BoxFuture<'static, ProviderResult<Movie>> {
        let result = self.find(id).map(|entry| self.to_movie(entry));
        Box::pin(async move { result })
    }

    fn cast(&self, id: MovieId) -> BoxFuture<'static, ProviderResult<Vec<CastMember>>> {
        let result = self.find(id).map(|entry| self.to_movie(entry).cast);
        Box::pin(async move { result })
    }

    fn filmography(&self, id: ActorId) -> BoxFuture<'static, ProviderResult<Vec<FilmCredit>>> {
        let result = self.lookup_filmography(id);
        Box::pin(async move { result })
    }

    fn random_movie(&self) -> BoxFuture<'static, ProviderResult<Movie>> {
        let result = self
            .movies
            .choose(&mut rng())
            .map(|entry| self.to_movie(entry))
            .ok_or(ProviderError::NoMovies);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const CATALOG: &str = r#"{
        "movies": [
            {
                "id": 1, "title": "Heat", "poster_path": "/heat.jpg", "year": 1995,
                "cast": [
                    { "id": 100, "name": "Robert De Niro", "photo_path": "/deniro.jpg" },
                    { "id": 101, "name": "Al Pacino", "photo_path": null },
                    { "id": 104, "name": "Val Kilmer", "photo_path": null }
                ]
            },
            {
                "id": 2, "title": "Ransom", "year": 1996,
                "cast": [
                    { "id": 102, "name": "Mel Gibson", "photo_path": null },
                    { "id": 100, "name": "Robert De Niro", "photo_path": "/deniro.jpg" }
                ]
            },
            {
                "id": 3, "title": "Casino", "year": 1995,
                "cast": [ { "id": 100, "name": "Robert De Niro", "photo_path": null } ]
            }
        ]
    }"#;

    pub(crate) fn catalog() -> StaticCatalog {
        StaticCatalog::from_json(CATALOG, ProviderLimits::default()).unwrap()
    }

    #[tokio::test]
    async fn movie_lookup_truncates_cast() {
        let catalog = StaticCatalog::from_json(
            CATALOG,
            ProviderLimits {
                cast_limit: 2,
                filmography_limit: None,
            },
        )
        .unwrap();

        let movie = catalog.movie(MovieId(1)).await.unwrap();
        assert_eq!(movie.title, "Heat");
        assert_eq!(movie.cast.len(), 2);
        assert_eq!(movie.cast[0].name, "Robert De Niro");
    }

    #[tokio::test]
    async fn filmography_is_derived_from_casts() {
        let films = catalog().filmography(ActorId(100)).await.unwrap();
        let ids = films.iter().map(|film| film.id.0).collect::<Vec<_>>();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(films[0].year, Some(1996));
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let catalog = catalog();
        assert!(matches!(
            catalog.movie(MovieId(99)).await,
            Err(ProviderError::MovieNotFound(MovieId(99)))
        ));
        assert!(matches!(
            catalog.filmography(ActorId(99)).await,
            Err(ProviderError::ActorNotFound(ActorId(99)))
        ));
    }

    #[tokio::test]
    async fn random_movie_requires_entries() {
        let movie = catalog().random_movie().await.unwrap();
        assert!([1, 2, 3].contains(&movie.id.0));

        let empty = StaticCatalog::empty(ProviderLimits::default());
        assert!(empty.is_empty());
        assert!(matches!(
            empty.random_movie().await,
            Err(ProviderError::NoMovies)
        ));
    }
}
