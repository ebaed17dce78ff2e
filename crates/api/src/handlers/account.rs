//! Handlers for the account submission endpoint.
//!
//! Every submitted record is re-validated with the same full schema the
//! wizard applies before sending it.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;
use signup_core::account::NewAccount;
use signup_core::error::CoreError;
use signup_core::types::DbId;
use signup_core::validation::Schema;
use signup_db::repositories::AccountRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /submit
///
/// Validate and store a complete account record. Returns 201 with the
/// created row.
pub async fn create_account(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<impl IntoResponse> {
    let Value::Object(record) = body else {
        return Err(AppError::BadRequest(
            "Request body must be a JSON object".to_string(),
        ));
    };

    let normalized = state
        .validator
        .validate(Schema::Full, &record)
        .await
        .map_err(AppError::InvalidRecord)?;
    let input = NewAccount::from_record(normalized)?;

    let account = AccountRepo::create(&state.pool, &input).await?;

    tracing::info!(account_id = account.id, "Account created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: account })))
}

/// GET /submit
///
/// List all stored accounts, newest first.
pub async fn list_accounts(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let accounts = AccountRepo::list(&state.pool).await?;

    Ok(Json(DataResponse { data: accounts }))
}

/// DELETE /submit/{id}
///
/// Remove an account and return the deleted row.
pub async fn delete_account(
    State(state): State<AppState>,
    Path(account_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let account = AccountRepo::delete(&state.pool, account_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Account",
            id: account_id,
        }))?;

    tracing::info!(account_id, "Account deleted");

    Ok(Json(DataResponse { data: account }))
}
