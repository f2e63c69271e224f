use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::movie::RandomPairResponse, error::AppError, services::round_service, state::SharedState,
};

/// Movie discovery endpoints.
pub fn router() -> Router<SharedState> {
    Router::new().route("/movies/random-pair", get(random_pair))
}

/// Propose two distinct movies to seed a round.
#[utoipa::path(
    get,
    path = "/movies/random-pair",
    tag = "movies",
    responses(
        (status = 200, description = "Two distinct seed movies", body = RandomPairResponse),
        (status = 502, description = "Metadata provider failed")
    )
)]
pub async fn random_pair(
    State(state): State<SharedState>,
) -> Result<Json<RandomPairResponse>, AppError> {
    Ok(Json(round_service::random_pair(&state).await?))
}
