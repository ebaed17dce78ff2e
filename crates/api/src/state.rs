use std::sync::Arc;

use signup_core::validation::SchemaValidator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: signup_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Full-schema validator applied to every submitted record.
    pub validator: Arc<SchemaValidator>,
}
