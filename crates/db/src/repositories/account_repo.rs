//! Repository for the `accounts` table.

use sqlx::PgPool;
use signup_core::account::NewAccount;
use signup_core::types::DbId;

use crate::models::account::Account;

/// Column list for `accounts` queries.
const COLUMNS: &str = "\
    id, email, first_name, last_name, date_of_birth, fiscal_code, \
    street, number_address, postal_code, province, city, country, \
    is_living_here, is_pep, created_at, updated_at";

/// Provides create, list and delete for finalized accounts.
pub struct AccountRepo;

impl AccountRepo {
    /// Insert a validated account, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewAccount) -> Result<Account, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts \
                 (email, first_name, last_name, date_of_birth, fiscal_code, \
                  street, number_address, postal_code, province, city, country, \
                  is_living_here, is_pep) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(&input.email)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.date_of_birth)
            .bind(&input.fiscal_code)
            .bind(&input.street)
            .bind(input.number_address)
            .bind(&input.postal_code)
            .bind(&input.province)
            .bind(&input.city)
            .bind(&input.country)
            .bind(input.is_living_here)
            .bind(input.is_pep)
            .fetch_one(pool)
            .await
    }

    /// List all accounts, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Account>(&query).fetch_all(pool).await
    }

    /// Delete an account, returning the removed row.
    ///
    /// Returns `None` if no account has the given ID.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("DELETE FROM accounts WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
