//! Connection pool setup for the favorites store.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use marquee_core::{logging, Error, Result};

/// Connections the server keeps at most. Every request runs a single
/// statement, so a small pool goes a long way.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Seconds to wait for a free connection before the request fails with 500.
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Seconds an unused connection stays open.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

/// Pool sizing and timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `DB_MAX_CONNECTIONS` and `DB_ACQUIRE_TIMEOUT_SECS`, keeping the
    /// defaults for unset or unparsable values.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(n) = env_parse::<u32>("DB_MAX_CONNECTIONS").filter(|n| *n > 0) {
            config.max_connections = n;
        }
        if let Some(secs) = env_parse::<u64>("DB_ACQUIRE_TIMEOUT_SECS") {
            config.acquire_timeout = Duration::from_secs(secs);
        }
        config
    }

    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n.max(1);
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Pool options for this configuration (before connecting).
    pub fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Connect with the default configuration.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    create_pool_with_config(database_url, PoolConfig::default()).await
}

/// Connect with an explicit configuration.
pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let start = Instant::now();

    let pool = config
        .options()
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = logging::SUBSYSTEM_DB,
        component = "pool",
        op = "connect",
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout.as_secs(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Favorites database connected"
    );
    Ok(pool)
}

/// Log pool occupancy; warns when every connection is checked out.
pub fn log_pool_metrics(pool: &PgPool) {
    let size = pool.size();
    let idle = pool.num_idle();

    debug!(
        subsystem = logging::SUBSYSTEM_DB,
        component = "pool",
        pool_size = size,
        pool_idle = idle,
        "Pool status"
    );
    if idle == 0 && size > 0 {
        warn!(
            subsystem = logging::SUBSYSTEM_DB,
            component = "pool",
            pool_size = size,
            "All pooled connections busy"
        );
    }
}
