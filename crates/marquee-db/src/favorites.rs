//! Favorite repository implementation.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use marquee_core::{
    logging, page_from_lookahead, Error, FavoriteEntry, FavoritePage, FavoritePatch,
    FavoriteRepository, MediaType, NewFavorite, PageRequest, Result, TextField,
};

const COLUMNS: &str = "id, title, media_type, director, budget, location, duration, \
                       year_time, poster_url, notes, created_at, updated_at";

/// PostgreSQL implementation of FavoriteRepository.
#[derive(Clone)]
pub struct PgFavoriteRepository {
    pool: Pool<Postgres>,
}

impl PgFavoriteRepository {
    /// Create a new PgFavoriteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_entry(row: PgRow) -> Result<FavoriteEntry> {
    let media_type: String = row.try_get("media_type").map_err(Error::Database)?;
    let media_type: MediaType = media_type.parse().map_err(Error::Internal)?;

    Ok(FavoriteEntry {
        id: row.get("id"),
        title: row.get("title"),
        media_type,
        director: row.get("director"),
        budget: row.get("budget"),
        location: row.get("location"),
        duration: row.get("duration"),
        year_time: row.get("year_time"),
        poster_url: row.get("poster_url"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl FavoriteRepository for PgFavoriteRepository {
    async fn create(&self, req: NewFavorite) -> Result<FavoriteEntry> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO favorite (title, media_type, director, budget, location, duration,
                                   year_time, poster_url, notes, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
             RETURNING {}",
            COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(&req.title)
            .bind(req.media_type.as_str())
            .bind(&req.director)
            .bind(&req.budget)
            .bind(&req.location)
            .bind(&req.duration)
            .bind(&req.year_time)
            .bind(&req.poster_url)
            .bind(&req.notes)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let entry = row_to_entry(row)?;
        debug!(
            subsystem = logging::SUBSYSTEM_DB,
            component = "favorites",
            op = "create",
            favorite_id = entry.id,
            "Favorite inserted"
        );
        Ok(entry)
    }

    async fn fetch(&self, id: i64) -> Result<FavoriteEntry> {
        let sql = format!("SELECT {} FROM favorite WHERE id = $1", COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::FavoriteNotFound(id))?;

        row_to_entry(row)
    }

    async fn list_page(&self, req: PageRequest) -> Result<FavoritePage> {
        let start = Instant::now();

        // Keyset scan over the primary key, walked backwards.
        let sql = format!(
            "SELECT {}
             FROM favorite
             WHERE ($1::BIGINT IS NULL OR id < $1)
             ORDER BY id DESC
             LIMIT $2",
            COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(req.cursor())
            .bind(req.fetch_size())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let entries = rows
            .into_iter()
            .map(row_to_entry)
            .collect::<Result<Vec<_>>>()?;
        let page = page_from_lookahead(entries, req.limit());

        debug!(
            subsystem = logging::SUBSYSTEM_DB,
            component = "favorites",
            op = "list_page",
            cursor = ?req.cursor(),
            limit = req.limit(),
            result_count = page.data.len(),
            has_more = page.has_more,
            duration_ms = start.elapsed().as_millis() as u64,
            "Favorite page fetched"
        );
        Ok(page)
    }

    async fn update(&self, id: i64, patch: FavoritePatch) -> Result<FavoriteEntry> {
        if patch.is_empty() {
            return self.fetch(id).await;
        }

        // Build dynamic SET clause; $1 is the timestamp and $2 the id.
        let mut updates = vec!["updated_at = $1".to_string()];
        let mut param_idx = 3;

        if patch.title.is_some() {
            updates.push(format!("title = ${}", param_idx));
            param_idx += 1;
        }
        if patch.media_type.is_some() {
            updates.push(format!("media_type = ${}", param_idx));
            param_idx += 1;
        }
        for field in TextField::ALL {
            if patch.text(field).is_some() {
                updates.push(format!("{} = ${}", field.column(), param_idx));
                param_idx += 1;
            }
        }

        let sql = format!(
            "UPDATE favorite SET {} WHERE id = $2 RETURNING {}",
            updates.join(", "),
            COLUMNS
        );

        let mut query = sqlx::query(&sql).bind(Utc::now()).bind(id);
        if let Some(title) = &patch.title {
            query = query.bind(title);
        }
        if let Some(media_type) = patch.media_type {
            query = query.bind(media_type.as_str());
        }
        for field in TextField::ALL {
            if let Some(value) = patch.text(field) {
                query = query.bind(value.clone());
            }
        }

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::FavoriteNotFound(id))?;

        debug!(
            subsystem = logging::SUBSYSTEM_DB,
            component = "favorites",
            op = "update",
            favorite_id = id,
            columns = param_idx - 3,
            "Favorite updated"
        );
        row_to_entry(row)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM favorite WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::FavoriteNotFound(id));
        }

        debug!(
            subsystem = logging::SUBSYSTEM_DB,
            component = "favorites",
            op = "delete",
            favorite_id = id,
            "Favorite deleted"
        );
        Ok(())
    }
}
