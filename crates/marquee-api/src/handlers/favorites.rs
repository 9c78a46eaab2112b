//! Favorite HTTP handlers.
//!
//! REST endpoints under `/api/favorites` plus the server-sent mutation feed.
//! Bodies are validated with [`FavoriteSchema`] before the store is touched;
//! every successful mutation is announced on the event bus.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Sse,
    },
    Json,
};
use serde_json::Value;
use tracing::{debug, info};

use marquee_core::{
    defaults, logging, EventEnvelope, FavoriteEntry, FavoriteEvent, FavoritePage, FavoriteSchema,
    FieldError, NewFavorite, ValidationErrors,
};

use crate::query_types::PageQuery;
use crate::{ApiError, AppState};

/// Parse a path id; non-numeric ids are a client error, not a lookup miss.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid favorite id: {}", raw)))
}

/// Decode a JSON request body, reporting malformed JSON as a `body` field error.
fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        ApiError::Validation(ValidationErrors::from(vec![FieldError::new(
            "body",
            format!("Invalid JSON: {}", e),
        )]))
    })
}

/// List favorites one page at a time, newest first.
///
/// # Query Parameters
/// - `limit`: page size, default 20, clamped to 100
/// - `cursor`: `nextCursor` from the previous page
///
/// Malformed values are ignored rather than rejected.
///
/// # Returns
/// - 200 OK with `{ data, nextCursor, hasMore }`
/// - 500 Internal Server Error if the store fails
#[utoipa::path(get, path = "/api/favorites", tag = "Favorites",
    params(
        ("limit" = Option<i64>, Query, description = "Page size (default 20, max 100)"),
        ("cursor" = Option<i64>, Query, description = "Id of the last entry already seen"),
    ),
    responses(
        (status = 200, description = "One page of favorites", body = FavoritePage),
        (status = 500, description = "Server error"),
    )
)]
pub async fn list_favorites(
    State(state): State<AppState>,
    query: Option<Query<PageQuery>>,
) -> Result<Json<FavoritePage>, ApiError> {
    let start = Instant::now();
    let req = query.map(|Query(q)| q).unwrap_or_default().to_request();

    let page = state.repo.list_page(req).await?;

    debug!(
        subsystem = logging::SUBSYSTEM_API,
        component = "favorites",
        op = "list",
        limit = req.limit(),
        cursor = ?req.cursor(),
        result_count = page.data.len(),
        has_more = page.has_more,
        duration_ms = start.elapsed().as_millis() as u64,
        "Listed favorites"
    );
    Ok(Json(page))
}

/// Get a single favorite.
///
/// # Returns
/// - 200 OK with the entry
/// - 400 Bad Request if the id is not an integer
/// - 404 Not Found if no entry has this id
#[utoipa::path(get, path = "/api/favorites/{id}", tag = "Favorites",
    params(("id" = i64, Path, description = "Favorite id")),
    responses(
        (status = 200, description = "The favorite", body = FavoriteEntry),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Favorite not found"),
    )
)]
pub async fn get_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FavoriteEntry>, ApiError> {
    let id = parse_id(&id)?;
    let entry = state.repo.fetch(id).await?;
    Ok(Json(entry))
}

/// Create a favorite.
///
/// `title` and `type` are required; every other field is optional.
///
/// # Returns
/// - 201 Created with the stored entry (including its id)
/// - 400 Bad Request with `details` listing every invalid field
#[utoipa::path(post, path = "/api/favorites", tag = "Favorites",
    request_body = NewFavorite,
    responses(
        (status = 201, description = "Favorite created", body = FavoriteEntry),
        (status = 400, description = "Validation failed"),
        (status = 500, description = "Server error"),
    )
)]
pub async fn create_favorite(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body = parse_body(&body)?;
    let new = FavoriteSchema::parse_create(&body)?;

    let entry = state.repo.create(new).await?;
    state.events.emit(FavoriteEvent::Created { id: entry.id });

    info!(
        subsystem = logging::SUBSYSTEM_API,
        component = "favorites",
        op = "create",
        favorite_id = entry.id,
        media_type = %entry.media_type,
        "Favorite created"
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Update a favorite.
///
/// Accepts any subset of the fields. Absent keys are left unchanged; `null`
/// clears an optional field.
///
/// # Returns
/// - 200 OK with the updated entry
/// - 400 Bad Request on validation failure or a non-integer id
/// - 404 Not Found if no entry has this id
#[utoipa::path(put, path = "/api/favorites/{id}", tag = "Favorites",
    params(("id" = i64, Path, description = "Favorite id")),
    request_body(content = NewFavorite, description = "Any subset of the favorite fields"),
    responses(
        (status = 200, description = "Favorite updated", body = FavoriteEntry),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Favorite not found"),
        (status = 500, description = "Server error"),
    )
)]
pub async fn update_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<FavoriteEntry>, ApiError> {
    let id = parse_id(&id)?;
    let body = parse_body(&body)?;
    let patch = FavoriteSchema::parse_patch(&body)?;

    let entry = state.repo.update(id, patch).await?;
    state.events.emit(FavoriteEvent::Updated { id });

    info!(
        subsystem = logging::SUBSYSTEM_API,
        component = "favorites",
        op = "update",
        favorite_id = id,
        "Favorite updated"
    );
    Ok(Json(entry))
}

/// Delete a favorite permanently.
///
/// # Returns
/// - 204 No Content
/// - 400 Bad Request if the id is not an integer
/// - 404 Not Found if no entry has this id
#[utoipa::path(delete, path = "/api/favorites/{id}", tag = "Favorites",
    params(("id" = i64, Path, description = "Favorite id")),
    responses(
        (status = 204, description = "Favorite deleted"),
        (status = 404, description = "Favorite not found"),
        (status = 500, description = "Server error"),
    )
)]
pub async fn delete_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.repo.delete(id).await?;
    state.events.emit(FavoriteEvent::Deleted { id });

    info!(
        subsystem = logging::SUBSYSTEM_API,
        component = "favorites",
        op = "delete",
        favorite_id = id,
        "Favorite deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// Server-sent stream of favorite mutations.
///
/// Each event is named after its type (`favorite.created`, `favorite.updated`,
/// `favorite.deleted`) and carries the JSON envelope as data. Lagged
/// receivers skip what they missed.
#[utoipa::path(get, path = "/api/favorites/events", tag = "Favorites",
    responses((status = 200, description = "text/event-stream of mutation events"))
)]
pub async fn favorite_events(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let rx = state.events.subscribe();
    debug!(
        subsystem = logging::SUBSYSTEM_API,
        component = "events",
        subscriber_count = state.events.subscriber_count(),
        "SSE client connected"
    );

    use tokio_stream::StreamExt as _;
    let stream = tokio_stream::wrappers::BroadcastStream::new(rx).filter_map(
        |result: Result<EventEnvelope, _>| match result {
            Ok(envelope) => match serde_json::to_string(&envelope) {
                Ok(json) => Some(Ok(Event::default()
                    .event(envelope.event_type.clone())
                    .id(envelope.event_id.to_string())
                    .data(json))),
                Err(_) => None,
            },
            Err(_) => None, // Skip lagged/closed errors
        },
    );

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(std::time::Duration::from_secs(defaults::SSE_KEEPALIVE_SECS))
            .text("keepalive"),
    )
}
