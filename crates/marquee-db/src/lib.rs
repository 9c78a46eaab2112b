//! # marquee-db
//!
//! PostgreSQL record store for marquee.
//!
//! This crate provides:
//! - Connection pool management
//! - The PostgreSQL favorite repository with keyset pagination
//! - An in-memory repository for tests and local development
//!
//! ## Example
//!
//! ```rust,ignore
//! use marquee_db::{Database, FavoriteRepository, MediaType, NewFavorite};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/marquee").await?;
//!
//!     let entry = db.favorites.create(NewFavorite::new("Heat", MediaType::Movie)).await?;
//!
//!     println!("Created favorite: {}", entry.id);
//!     Ok(())
//! }
//! ```
pub mod favorites;
pub mod memory;
pub mod pool;

// Migrates a private schema, so it needs the embedded migrations.
#[cfg(any(test, feature = "migrations"))]
pub mod test_fixtures;

use std::sync::Arc;

// Re-export core types
pub use marquee_core::*;

pub use favorites::PgFavoriteRepository;
pub use memory::InMemoryFavoriteRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Combined database context.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Favorite repository for CRUD and paging.
    pub favorites: PgFavoriteRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            favorites: PgFavoriteRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// The favorite repository as a shareable trait object.
    pub fn favorite_repository(&self) -> Arc<dyn FavoriteRepository> {
        Arc::new(self.favorites.clone())
    }
}
