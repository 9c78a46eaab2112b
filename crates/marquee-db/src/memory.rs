//! InMemoryFavoriteRepository - BTreeMap-backed record store for tests and
//! local development without PostgreSQL.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use marquee_core::{
    page_from_lookahead, Error, FavoriteEntry, FavoritePage, FavoritePatch, FavoriteRepository,
    NewFavorite, PageRequest, Result,
};

struct MemoryState {
    next_id: i64,
    rows: BTreeMap<i64, FavoriteEntry>,
}

/// In-memory favorite store.
///
/// Ids start at 1 and are never reused, even after deletes. Clone-friendly
/// via Arc; clones share the same rows.
#[derive(Clone)]
pub struct InMemoryFavoriteRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl Default for InMemoryFavoriteRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFavoriteRepository {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState {
                next_id: 1,
                rows: BTreeMap::new(),
            })),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.read().map(|s| s.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| Error::Internal("lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| Error::Internal("lock poisoned".into()))
    }
}

#[async_trait]
impl FavoriteRepository for InMemoryFavoriteRepository {
    async fn create(&self, req: NewFavorite) -> Result<FavoriteEntry> {
        let mut state = self.write()?;
        let id = state.next_id;
        state.next_id += 1;

        let now = Utc::now();
        let entry = FavoriteEntry {
            id,
            title: req.title,
            media_type: req.media_type,
            director: req.director,
            budget: req.budget,
            location: req.location,
            duration: req.duration,
            year_time: req.year_time,
            poster_url: req.poster_url,
            notes: req.notes,
            created_at: now,
            updated_at: now,
        };
        state.rows.insert(id, entry.clone());
        Ok(entry)
    }

    async fn fetch(&self, id: i64) -> Result<FavoriteEntry> {
        self.read()?
            .rows
            .get(&id)
            .cloned()
            .ok_or(Error::FavoriteNotFound(id))
    }

    async fn list_page(&self, req: PageRequest) -> Result<FavoritePage> {
        let state = self.read()?;
        let fetch = usize::try_from(req.fetch_size()).unwrap_or(0);

        let rows: Vec<FavoriteEntry> = match req.cursor() {
            Some(cursor) => state
                .rows
                .range(..cursor)
                .rev()
                .take(fetch)
                .map(|(_, entry)| entry.clone())
                .collect(),
            None => state.rows.values().rev().take(fetch).cloned().collect(),
        };
        Ok(page_from_lookahead(rows, req.limit()))
    }

    async fn update(&self, id: i64, patch: FavoritePatch) -> Result<FavoriteEntry> {
        let mut state = self.write()?;
        let entry = state
            .rows
            .get_mut(&id)
            .ok_or(Error::FavoriteNotFound(id))?;

        if !patch.is_empty() {
            patch.apply_to(entry);
            entry.updated_at = Utc::now();
        }
        Ok(entry.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.write()?
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::FavoriteNotFound(id))
    }
}
