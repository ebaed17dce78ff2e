/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development next to the
/// wizard frontend on port 3000.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `4000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Simulated latency of the fiscal code registry lookup in milliseconds
    /// (default: `500`).
    pub fiscal_code_latency_ms: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                    |
    /// |--------------------------------|----------------------------|
    /// | `HOST`                         | `0.0.0.0`                  |
    /// | `PORT`                         | `4000`                     |
    /// | `CORS_ORIGINS`                 | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS`         | `30`                       |
    /// | `FISCAL_CODE_CHECK_LATENCY_MS` | `500`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "4000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let fiscal_code_latency_ms: u64 = std::env::var("FISCAL_CODE_CHECK_LATENCY_MS")
            .unwrap_or_else(|_| "500".into())
            .parse()
            .expect("FISCAL_CODE_CHECK_LATENCY_MS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            fiscal_code_latency_ms,
        }
    }
}
