use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use axum_valid::Valid;

use crate::{
    dto::{
        history::HistoryResponse,
        validation::{AccountPath, HistoryRecordPath},
    },
    error::AppError,
    services::history_service,
    state::SharedState,
};

/// Completed connection endpoints scoped to an account.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/accounts/{account_id}/history", get(list_history))
        .route(
            "/accounts/{account_id}/history/{id}",
            delete(delete_connection),
        )
}

/// List the connections the account completed, oldest first.
#[utoipa::path(
    get,
    path = "/accounts/{account_id}/history",
    tag = "history",
    params(("account_id" = String, Path, description = "Account owning the history")),
    responses(
        (status = 200, description = "Completed connections", body = HistoryResponse),
        (status = 503, description = "History store unavailable")
    )
)]
pub async fn list_history(
    State(state): State<SharedState>,
    Valid(Path(path)): Valid<Path<AccountPath>>,
) -> Result<Json<HistoryResponse>, AppError> {
    Ok(Json(history_service::list(&state, &path.account_id).await?))
}

/// Delete one of the account's completed connections.
#[utoipa::path(
    delete,
    path = "/accounts/{account_id}/history/{id}",
    tag = "history",
    params(
        ("account_id" = String, Path, description = "Account owning the history"),
        ("id" = String, Path, description = "Identifier of the completed connection")
    ),
    responses(
        (status = 204, description = "Connection deleted"),
        (status = 404, description = "Connection not found")
    )
)]
pub async fn delete_connection(
    State(state): State<SharedState>,
    Valid(Path(path)): Valid<Path<HistoryRecordPath>>,
) -> Result<StatusCode, AppError> {
    history_service::delete(&state, &path.account_id, path.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
