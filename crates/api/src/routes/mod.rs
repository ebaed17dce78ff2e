pub mod account;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the full route tree.
///
/// ```text
/// /health               service and database health
/// /submit               create, list accounts
/// /submit/{id}          delete account
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/submit", account::router())
}
