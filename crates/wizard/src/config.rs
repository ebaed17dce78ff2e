use std::path::PathBuf;
use std::time::Duration;

/// Wizard runtime configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development against the API
/// server on port 4000.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Base URL of the submission endpoint (without the `/submit` path).
    pub submit_api_url: String,
    /// Whether the read-only review step follows the address step.
    pub include_review_step: bool,
    /// Directory holding the persisted draft.
    pub store_dir: PathBuf,
    /// Timeout for a single submission request.
    pub submit_timeout: Duration,
    /// Simulated latency of the fiscal code registry lookup.
    pub fiscal_code_latency: Duration,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            submit_api_url: "http://localhost:4000".into(),
            include_review_step: true,
            store_dir: PathBuf::from(".signup-wizard"),
            submit_timeout: Duration::from_secs(10),
            fiscal_code_latency: Duration::from_millis(500),
        }
    }
}

impl WizardConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                  |
    /// |--------------------------------|--------------------------|
    /// | `SUBMIT_API_URL`               | `http://localhost:4000`  |
    /// | `WIZARD_REVIEW_STEP`           | `true`                   |
    /// | `WIZARD_STORE_DIR`             | `.signup-wizard`         |
    /// | `SUBMIT_TIMEOUT_SECS`          | `10`                     |
    /// | `FISCAL_CODE_CHECK_LATENCY_MS` | `500`                    |
    ///
    /// Unparseable values fall back to the default with a warning.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let submit_api_url = std::env::var("SUBMIT_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.submit_api_url);

        let include_review_step = std::env::var("WIZARD_REVIEW_STEP")
            .ok()
            .and_then(|v| parse_env("WIZARD_REVIEW_STEP", &v))
            .unwrap_or(defaults.include_review_step);

        let store_dir = std::env::var("WIZARD_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.store_dir);

        let submit_timeout = std::env::var("SUBMIT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| parse_env("SUBMIT_TIMEOUT_SECS", &v))
            .map(Duration::from_secs)
            .unwrap_or(defaults.submit_timeout);

        let fiscal_code_latency = std::env::var("FISCAL_CODE_CHECK_LATENCY_MS")
            .ok()
            .and_then(|v| parse_env("FISCAL_CODE_CHECK_LATENCY_MS", &v))
            .map(Duration::from_millis)
            .unwrap_or(defaults.fiscal_code_latency);

        Self {
            submit_api_url,
            include_review_step,
            store_dir,
            submit_timeout,
            fiscal_code_latency,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(name, value = raw, "Ignoring unparseable environment variable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_server() {
        let config = WizardConfig::default();
        assert_eq!(config.submit_api_url, "http://localhost:4000");
        assert!(config.include_review_step);
        assert_eq!(config.fiscal_code_latency, Duration::from_millis(500));
    }

    #[test]
    fn parse_env_accepts_and_rejects() {
        assert_eq!(parse_env::<bool>("WIZARD_REVIEW_STEP", " false "), Some(false));
        assert_eq!(parse_env::<u64>("SUBMIT_TIMEOUT_SECS", "ten"), None);
    }
}
