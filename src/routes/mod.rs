use axum::Router;

use crate::state::SharedState;

pub mod accounts;
pub mod docs;
pub mod health;
pub mod history;
pub mod movies;
pub mod rounds;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(movies::router())
        .merge(rounds::router())
        .merge(history::router())
        .merge(accounts::router());

    api_router.merge(docs::router()).with_state(state)
}
