use std::sync::Arc;

use futures::future::BoxFuture;
use rand::{Rng, rng, seq::IndexedRandom};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{
    config::TmdbConfig,
    error::{TmdbError, TmdbResult},
    models::{
        CreditsResponse, DiscoverResponse, MAX_DISCOVER_PAGE, MovieDetailsResponse,
        PersonCreditsResponse,
    },
};
use crate::{
    metadata::{MetadataProvider, ProviderError, ProviderLimits, ProviderResult},
    state::game::{ActorId, CastMember, FilmCredit, Movie, MovieId},
};

/// Metadata provider backed by The Movie Database REST API.
#[derive(Clone)]
pub struct TmdbProvider {
    client: Client,
    base_url: Arc<str>,
    api_key: Arc<str>,
    language: Arc<str>,
    limits: ProviderLimits,
}

impl TmdbProvider {
    /// Build the HTTP client for the configured endpoint.
    pub fn new(config: TmdbConfig, limits: ProviderLimits) -> TmdbResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| TmdbError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            api_key: Arc::<str>::from(config.api_key),
            language: Arc::<str>::from(config.language),
            limits,
        })
    }

    /// GET a JSON resource, mapping a 404 to `None`.
    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> TmdbResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%path, "querying TMDB");

        let response = self
            .client
            .get(url)
            .query(&[
                ("api_key", self.api_key.as_ref()),
                ("language", self.language.as_ref()),
            ])
            .query(query)
            .send()
            .await
            .map_err(|source| TmdbError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    TmdbError::DecodeResponse {
                        path: path.to_string(),
                        source,
                    }
                })
            }
            other => Err(TmdbError::RequestStatus {
                path: path.to_string(),
                status: other,
            }),
        }
    }

    async fn fetch_cast(&self, id: MovieId) -> ProviderResult<Vec<CastMember>> {
        let credits = self
            .get_json::<CreditsResponse>(&format!("movie/{id}/credits"), &[])
            .await?
            .ok_or(ProviderError::MovieNotFound(id))?;
        Ok(self.limits.limit_cast(credits.into_cast()))
    }

    async fn fetch_movie(&self, id: MovieId) -> ProviderResult<Movie> {
        let details = self
            .get_json::<MovieDetailsResponse>(&format!("movie/{id}"), &[])
            .await?
            .ok_or(ProviderError::MovieNotFound(id))?;
        let cast = self.fetch_cast(id).await?;

        Ok(Movie {
            id: MovieId(details.id),
            title: details.title,
            poster_path: details.poster_path,
            cast,
        })
    }

    async fn fetch_filmography(&self, id: ActorId) -> ProviderResult<Vec<FilmCredit>> {
        let credits = self
            .get_json::<PersonCreditsResponse>(&format!("person/{id}/movie_credits"), &[])
            .await?
            .ok_or(ProviderError::ActorNotFound(id))?;
        Ok(self.limits.arrange_filmography(credits.into_filmography()))
    }

    async fn fetch_random_movie(&self, page: u32) -> ProviderResult<Movie> {
        let discover = self
            .get_json::<DiscoverResponse>("discover/movie", &[("page", page.to_string())])
            .await?
            .unwrap_or(DiscoverResponse {
                results: Vec::new(),
            });

        let entry = discover
            .results
            .choose(&mut rng())
            .cloned()
            .ok_or(ProviderError::NoMovies)?;
        let cast = self.fetch_cast(MovieId(entry.id)).await?;

        Ok(Movie {
            id: MovieId(entry.id),
            title: entry.title,
            poster_path: entry.poster_path,
            cast,
        })
    }
}

impl MetadataProvider for TmdbProvider {
    fn movie(&self, id: MovieId) -> BoxFuture<'static, ProviderResult<Movie>> {
        let provider = self.clone();
        Box::pin(async move { provider.fetch_movie(id).await })
    }

    fn cast(&self, id: MovieId) -> BoxFuture<'static, ProviderResult<Vec<CastMember>>> {
        let provider = self.clone();
        Box::pin(async move { provider.fetch_cast(id).await })
    }

    fn filmography(&self, id: ActorId) -> BoxFuture<'static, ProviderResult<Vec<FilmCredit>>> {
        let provider = self.clone();
        Box::pin(async move { provider.fetch_filmography(id).await })
    }

    fn random_movie(&self) -> BoxFuture<'static, ProviderResult<Movie>> {
        let provider = self.clone();
        let page = rng().random_range(1..=MAX_DISCOVER_PAGE);
        Box::pin(async move { provider.fetch_random_movie(page).await })
    }
}
