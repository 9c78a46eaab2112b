//! Server configuration from environment variables.

use axum::http::HeaderValue;

use marquee_core::defaults;

/// Default CORS origins (the Vite dev server and a local static host).
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Apply pending migrations at startup.
    pub run_migrations: bool,
    /// Browser origins allowed by CORS.
    pub allowed_origins: Vec<HeaderValue>,
    /// Maximum accepted request body, in bytes.
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            database_url: defaults::DATABASE_URL.to_string(),
            run_migrations: true,
            allowed_origins: parse_allowed_origins(DEFAULT_ALLOWED_ORIGINS),
            body_limit: defaults::REQUEST_BODY_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the environment. Pool sizing is read
    /// separately by `marquee_db::PoolConfig::from_env`.
    ///
    /// Environment variables:
    ///   DATABASE_URL        - Postgres connection string (default: postgres://localhost/marquee)
    ///   HOST                - bind address (default: 0.0.0.0)
    ///   PORT                - bind port (default: 4000)
    ///   RUN_MIGRATIONS      - "false"/"0" to skip startup migrations (default: true)
    ///   ALLOWED_ORIGINS     - comma-separated CORS whitelist
    pub fn from_env() -> Self {
        let base = Self::default();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(base.port);
        let run_migrations = std::env::var("RUN_MIGRATIONS")
            .map(|v| !(v == "false" || v == "0"))
            .unwrap_or(base.run_migrations);
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|v| parse_allowed_origins(&v))
            .unwrap_or(base.allowed_origins);

        Self {
            host: std::env::var("HOST").unwrap_or(base.host),
            port,
            database_url: std::env::var("DATABASE_URL").unwrap_or(base.database_url),
            run_migrations,
            allowed_origins,
            body_limit: base.body_limit,
        }
    }

    /// `host:port` string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a comma-separated origin list into header values.
///
/// Blank entries are skipped and invalid ones logged and dropped. An empty
/// list falls back to [`DEFAULT_ALLOWED_ORIGINS`].
///
/// ```text
/// ALLOWED_ORIGINS=https://favorites.example.com,http://localhost:5173
/// ```
pub fn parse_allowed_origins(origins_str: &str) -> Vec<HeaderValue> {
    if origins_str.trim().is_empty() {
        return parse_allowed_origins(DEFAULT_ALLOWED_ORIGINS);
    }

    origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}
