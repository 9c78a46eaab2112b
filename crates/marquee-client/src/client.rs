//! HTTP client for the favorites API.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use marquee_core::{
    defaults, logging, FavoriteEntry, FavoritePage, FavoritePatch, FieldError, NewFavorite,
};

use crate::error::{ClientError, Result};

/// Source of favorite pages for the infinite-scroll state.
///
/// [`FavoritesClient`] is the production implementation; tests substitute
/// scripted sources.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch `limit` entries after `cursor` (newest first when `cursor` is `None`).
    async fn fetch_page(&self, limit: i64, cursor: Option<i64>) -> Result<FavoritePage>;
}

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<serde_json::Value>,
    #[serde(default)]
    details: Vec<FieldError>,
}

/// Favorites API client.
#[derive(Debug, Clone)]
pub struct FavoritesClient {
    client: Client,
    base_url: String,
}

impl FavoritesClient {
    /// Create a client for the API at `base_url` (e.g. `http://localhost:4000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing reqwest client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Create from the `MARQUEE_API_URL` environment variable.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("MARQUEE_API_URL").unwrap_or_else(|_| defaults::API_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/favorites{}", self.base_url, path)
    }

    /// Fetch one page of favorites.
    pub async fn list_page(&self, limit: i64, cursor: Option<i64>) -> Result<FavoritePage> {
        let start = Instant::now();
        let mut query = vec![("limit", limit.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let response = self.client.get(self.url("")).query(&query).send().await?;
        let page: FavoritePage = decode(response).await?;

        debug!(
            subsystem = logging::SUBSYSTEM_CLIENT,
            op = "list_page",
            limit,
            cursor = ?cursor,
            result_count = page.data.len(),
            has_more = page.has_more,
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched favorites page"
        );
        Ok(page)
    }

    /// Fetch one favorite.
    pub async fn get(&self, id: i64) -> Result<FavoriteEntry> {
        let response = self.client.get(self.url(&format!("/{}", id))).send().await?;
        decode(response).await
    }

    /// Create a favorite.
    pub async fn create(&self, new: &NewFavorite) -> Result<FavoriteEntry> {
        let response = self.client.post(self.url("")).json(new).send().await?;
        let entry: FavoriteEntry = decode(response).await?;
        debug!(
            subsystem = logging::SUBSYSTEM_CLIENT,
            op = "create",
            favorite_id = entry.id,
            "Favorite created"
        );
        Ok(entry)
    }

    /// Apply a partial update.
    pub async fn update(&self, id: i64, patch: &FavoritePatch) -> Result<FavoriteEntry> {
        let response = self
            .client
            .put(self.url(&format!("/{}", id)))
            .json(patch)
            .send()
            .await?;
        let entry: FavoriteEntry = decode(response).await?;
        debug!(
            subsystem = logging::SUBSYSTEM_CLIENT,
            op = "update",
            favorite_id = id,
            "Favorite updated"
        );
        Ok(entry)
    }

    /// Delete a favorite.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/{}", id)))
            .send()
            .await?;
        check(response).await?;
        debug!(
            subsystem = logging::SUBSYSTEM_CLIENT,
            op = "delete",
            favorite_id = id,
            "Favorite deleted"
        );
        Ok(())
    }
}

#[async_trait]
impl PageSource for FavoritesClient {
    async fn fetch_page(&self, limit: i64, cursor: Option<i64>) -> Result<FavoritePage> {
        self.list_page(limit, cursor).await
    }
}

/// Pass successful responses through; map error statuses to [`ClientError`].
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body: Option<ErrorBody> = serde_json::from_str(&text).ok();
    let message = match body.as_ref().and_then(|b| b.error.as_ref()) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None if text.is_empty() => status.to_string(),
        None => text.clone(),
    };

    Err(match status {
        StatusCode::BAD_REQUEST => match body {
            Some(body) if !body.details.is_empty() => ClientError::Validation(body.details),
            _ => ClientError::Http {
                status: status.as_u16(),
                message,
            },
        },
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        _ => ClientError::Http {
            status: status.as_u16(),
            message,
        },
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check(response).await?;
    response
        .json()
        .await
        .map_err(|e| ClientError::Decode(format!("Failed to parse response: {}", e)))
}
