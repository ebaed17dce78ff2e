//! Fiscal code registry lookup.
//!
//! The registry is an external collaborator. [`SimulatedRegistry`] stands in
//! for it: it waits a fixed latency and accepts a single reference code.

use std::time::Duration;

use async_trait::async_trait;

/// The one code the simulated registry recognises.
pub const REFERENCE_FISCAL_CODE: &str = "ABCDEF85S14F112Y";

/// Default simulated lookup latency.
pub const DEFAULT_LOOKUP_LATENCY: Duration = Duration::from_millis(500);

/// Remote validity check for a shape-valid fiscal code.
///
/// Implementations must report lookup failures as `false`; callers treat a
/// slow rejection exactly like a fast one.
#[async_trait]
pub trait FiscalCodeRegistry: Send + Sync {
    async fn is_registered(&self, fiscal_code: &str) -> bool;
}

/// Registry stand-in with configurable latency.
#[derive(Debug, Clone)]
pub struct SimulatedRegistry {
    known_code: String,
    latency: Duration,
}

impl SimulatedRegistry {
    pub fn new(latency: Duration) -> Self {
        Self {
            known_code: REFERENCE_FISCAL_CODE.to_string(),
            latency,
        }
    }

    /// Accept a different reference code.
    pub fn with_known_code(mut self, code: impl Into<String>) -> Self {
        self.known_code = code.into();
        self
    }
}

impl Default for SimulatedRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_LATENCY)
    }
}

#[async_trait]
impl FiscalCodeRegistry for SimulatedRegistry {
    async fn is_registered(&self, fiscal_code: &str) -> bool {
        if fiscal_code.is_empty() {
            return false;
        }
        tokio::time::sleep(self.latency).await;
        let registered = fiscal_code == self.known_code;
        tracing::debug!(registered, "Fiscal code registry lookup finished");
        registered
    }
}
