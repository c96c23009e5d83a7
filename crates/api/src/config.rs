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
    /// HTTP request timeout in seconds (default: `600`). Generation batches
    /// are long-running; this bounds the batch deadline plus slack.
    pub request_timeout_secs: u64,
    /// Base URL of the image generation service.
    pub generation_base_url: String,
    /// API key for the image generation service.
    pub generation_api_key: String,
    /// Base URL of the visual analysis service.
    pub analyst_base_url: String,
    /// API key for the visual analysis service.
    pub analyst_api_key: String,
    /// Base URL of the object storage service.
    pub storage_base_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `600`                      |
    /// | `GENERATION_BASE_URL`  | `http://localhost:8188`    |
    /// | `GENERATION_API_KEY`   | (empty)                    |
    /// | `ANALYST_BASE_URL`     | `http://localhost:8189`    |
    /// | `ANALYST_API_KEY`      | (empty)                    |
    /// | `STORAGE_BASE_URL`     | `http://localhost:8190`    |
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
            .unwrap_or_else(|_| "600".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let env_or = |name: &str, default: &str| {
            std::env::var(name).unwrap_or_else(|_| default.into())
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            generation_base_url: env_or("GENERATION_BASE_URL", "http://localhost:8188"),
            generation_api_key: env_or("GENERATION_API_KEY", ""),
            analyst_base_url: env_or("ANALYST_BASE_URL", "http://localhost:8189"),
            analyst_api_key: env_or("ANALYST_API_KEY", ""),
            storage_base_url: env_or("STORAGE_BASE_URL", "http://localhost:8190"),
        }
    }
}
