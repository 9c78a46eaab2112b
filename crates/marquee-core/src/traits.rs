//! Core traits for marquee abstractions.
//!
//! The record store is defined as a trait so the HTTP layer can run against
//! PostgreSQL in production and an in-memory store in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{FavoriteEntry, FavoritePage, FavoritePatch, NewFavorite};
use crate::pagination::PageRequest;

// =============================================================================
// FAVORITE REPOSITORY
// =============================================================================

/// Record store for favorite entries.
///
/// Every operation is a single-row, self-contained statement; implementations
/// must assign ids from a monotonic source that never reuses values.
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Insert a new entry and return it with its assigned id.
    async fn create(&self, req: NewFavorite) -> Result<FavoriteEntry>;

    /// Fetch one entry. Returns `Error::FavoriteNotFound` if absent.
    async fn fetch(&self, id: i64) -> Result<FavoriteEntry>;

    /// One page ordered by descending id, after the request's cursor.
    async fn list_page(&self, req: PageRequest) -> Result<FavoritePage>;

    /// Apply a partial update. Returns `Error::FavoriteNotFound` if absent.
    async fn update(&self, id: i64, patch: FavoritePatch) -> Result<FavoriteEntry>;

    /// Permanently delete. Returns `Error::FavoriteNotFound` if absent.
    async fn delete(&self, id: i64) -> Result<()>;
}
