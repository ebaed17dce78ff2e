use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::account;
use crate::state::AppState;

/// Account submission routes mounted at `/submit`.
///
/// ```text
/// POST   /        -> create_account
/// GET    /        -> list_accounts
/// DELETE /{id}    -> delete_account
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(account::list_accounts).post(account::create_account))
        .route("/{id}", delete(account::delete_account))
}
