use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use axum_valid::Valid;

use crate::{
    dto::{entitlement::EntitlementResponse, validation::AccountPath},
    error::AppError,
    services::entitlement_service,
    state::SharedState,
};

/// Account-level information.
pub fn router() -> Router<SharedState> {
    Router::new().route("/accounts/{account_id}/entitlement", get(entitlement))
}

/// Report how many rounds the account may still start today.
#[utoipa::path(
    get,
    path = "/accounts/{account_id}/entitlement",
    tag = "accounts",
    params(("account_id" = String, Path, description = "Account to inspect")),
    responses((status = 200, description = "Round allowance", body = EntitlementResponse))
)]
pub async fn entitlement(
    State(state): State<SharedState>,
    Valid(Path(path)): Valid<Path<AccountPath>>,
) -> Result<Json<EntitlementResponse>, AppError> {
    Ok(Json(
        entitlement_service::status(&state, &path.account_id).await?,
    ))
}
