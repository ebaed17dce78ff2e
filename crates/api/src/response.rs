//! Shared response envelope types for API handlers.
//!
//! All successful responses use a `{ "data": ... }` envelope; the wizard's
//! submission client decodes exactly this shape.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
