use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Delay between accepting a creation and running its generation,
    /// in seconds (default: `3`).
    pub generation_delay_secs: u64,
    /// How often the in-process worker polls for due tasks, in
    /// milliseconds (default: `500`).
    pub worker_poll_interval_ms: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `GENERATION_DELAY_SECS`   | `3`                     |
    /// | `WORKER_POLL_INTERVAL_MS` | `500`                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let generation_delay_secs: u64 = std::env::var("GENERATION_DELAY_SECS")
            .unwrap_or_else(|_| {
                visioncast_core::creation::DEFAULT_GENERATION_DELAY_SECS.to_string()
            })
            .parse()
            .expect("GENERATION_DELAY_SECS must be a valid u64");

        let worker_poll_interval_ms: u64 = std::env::var("WORKER_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "500".into())
            .parse()
            .expect("WORKER_POLL_INTERVAL_MS must be a valid u64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            generation_delay_secs,
            worker_poll_interval_ms,
            jwt,
        }
    }
}
