//! Account entity model.

use serde::Serialize;
use sqlx::FromRow;
use signup_core::types::{DbId, Timestamp};

/// A row from the `accounts` table.
///
/// Serialises with the same camelCase field names the wizard submits, plus
/// the generated `id` and timestamps.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub fiscal_code: String,
    pub street: String,
    pub number_address: i64,
    pub postal_code: String,
    pub province: String,
    pub city: String,
    pub country: String,
    pub is_living_here: Option<bool>,
    #[serde(rename = "isPEP")]
    pub is_pep: Option<bool>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
