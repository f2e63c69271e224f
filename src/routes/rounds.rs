use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::{
        history::CompletedConnectionSummary,
        round::{RoundSnapshot, SelectActorRequest, SelectMovieRequest, StartRoundRequest},
        validation::AccountPath,
    },
    error::AppError,
    services::round_service,
    state::SharedState,
};

/// Round lifecycle endpoints scoped to an account.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/accounts/{account_id}/rounds", post(start_round))
        .route(
            "/accounts/{account_id}/rounds/current",
            get(current_round).delete(abandon_round),
        )
        .route(
            "/accounts/{account_id}/rounds/current/actor",
            post(select_actor),
        )
        .route(
            "/accounts/{account_id}/rounds/current/movie",
            post(select_movie),
        )
        .route(
            "/accounts/{account_id}/rounds/current/commit",
            post(commit_round),
        )
}

/// Start a round from two seed movies, replacing the account's unfinished round.
#[utoipa::path(
    post,
    path = "/accounts/{account_id}/rounds",
    tag = "rounds",
    params(("account_id" = String, Path, description = "Account playing the round")),
    request_body = StartRoundRequest,
    responses(
        (status = 200, description = "Round started", body = RoundSnapshot),
        (status = 403, description = "Daily allowance used up"),
        (status = 404, description = "Unknown seed movie")
    )
)]
pub async fn start_round(
    State(state): State<SharedState>,
    Valid(Path(path)): Valid<Path<AccountPath>>,
    Valid(Json(payload)): Valid<Json<StartRoundRequest>>,
) -> Result<Json<RoundSnapshot>, AppError> {
    Ok(Json(
        round_service::start_round(&state, &path.account_id, payload).await?,
    ))
}

/// Retrieve the account's round with both frontiers and their candidates.
#[utoipa::path(
    get,
    path = "/accounts/{account_id}/rounds/current",
    tag = "rounds",
    params(("account_id" = String, Path, description = "Account playing the round")),
    responses(
        (status = 200, description = "Round in progress or won", body = RoundSnapshot),
        (status = 404, description = "No round in progress")
    )
)]
pub async fn current_round(
    State(state): State<SharedState>,
    Valid(Path(path)): Valid<Path<AccountPath>>,
) -> Result<Json<RoundSnapshot>, AppError> {
    Ok(Json(
        round_service::current_round(&state, &path.account_id).await?,
    ))
}

/// Drop the account's round without recording it.
#[utoipa::path(
    delete,
    path = "/accounts/{account_id}/rounds/current",
    tag = "rounds",
    params(("account_id" = String, Path, description = "Account playing the round")),
    responses(
        (status = 204, description = "Round abandoned"),
        (status = 404, description = "No round in progress")
    )
)]
pub async fn abandon_round(
    State(state): State<SharedState>,
    Valid(Path(path)): Valid<Path<AccountPath>>,
) -> Result<StatusCode, AppError> {
    round_service::abandon_round(&state, &path.account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Advance a side from its movie to a member of that movie's cast.
#[utoipa::path(
    post,
    path = "/accounts/{account_id}/rounds/current/actor",
    tag = "rounds",
    params(("account_id" = String, Path, description = "Account playing the round")),
    request_body = SelectActorRequest,
    responses(
        (status = 200, description = "Move applied", body = RoundSnapshot),
        (status = 400, description = "Actor not selectable from this side"),
        (status = 409, description = "Round already won or changed concurrently")
    )
)]
pub async fn select_actor(
    State(state): State<SharedState>,
    Valid(Path(path)): Valid<Path<AccountPath>>,
    Valid(Json(payload)): Valid<Json<SelectActorRequest>>,
) -> Result<Json<RoundSnapshot>, AppError> {
    Ok(Json(
        round_service::select_actor(&state, &path.account_id, payload).await?,
    ))
}

/// Advance a side from its actor to one of that actor's films.
#[utoipa::path(
    post,
    path = "/accounts/{account_id}/rounds/current/movie",
    tag = "rounds",
    params(("account_id" = String, Path, description = "Account playing the round")),
    request_body = SelectMovieRequest,
    responses(
        (status = 200, description = "Move applied", body = RoundSnapshot),
        (status = 400, description = "Movie not selectable from this side"),
        (status = 409, description = "Round already won or changed concurrently")
    )
)]
pub async fn select_movie(
    State(state): State<SharedState>,
    Valid(Path(path)): Valid<Path<AccountPath>>,
    Valid(Json(payload)): Valid<Json<SelectMovieRequest>>,
) -> Result<Json<RoundSnapshot>, AppError> {
    Ok(Json(
        round_service::select_movie(&state, &path.account_id, payload).await?,
    ))
}

/// Record the won round in the account's history.
#[utoipa::path(
    post,
    path = "/accounts/{account_id}/rounds/current/commit",
    tag = "rounds",
    params(("account_id" = String, Path, description = "Account playing the round")),
    responses(
        (status = 200, description = "Connection recorded", body = CompletedConnectionSummary),
        (status = 409, description = "Round not won yet"),
        (status = 503, description = "History store unavailable")
    )
)]
pub async fn commit_round(
    State(state): State<SharedState>,
    Valid(Path(path)): Valid<Path<AccountPath>>,
) -> Result<Json<CompletedConnectionSummary>, AppError> {
    Ok(Json(
        round_service::commit_round(&state, &path.account_id).await?,
    ))
}
