/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A raw or normalised account record keyed by camelCase field name.
pub type Record = serde_json::Map<String, serde_json::Value>;
