//! # marquee-api
//!
//! HTTP API for the marquee favorites tracker.
//!
//! Routes:
//! - `GET/POST /api/favorites` - keyset-paginated listing and creation
//! - `GET/PUT/DELETE /api/favorites/:id` - single-entry read, partial update, delete
//! - `GET /api/favorites/events` - server-sent mutation feed
//! - `GET /health`, `GET /docs`

pub mod config;
pub mod error;
pub mod handlers;
pub mod query_types;

use std::sync::Arc;

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use marquee_core::{
    logging, EventBus, FavoriteEntry, FavoritePage, FavoriteRepository, FieldError, MediaType,
    NewFavorite,
};
use marquee_db::InMemoryFavoriteRepository;

pub use config::ServerConfig;
pub use error::{ApiError, SERVER_ERROR_MESSAGE};

use handlers::favorites::{
    create_favorite, delete_favorite, favorite_events, get_favorite, list_favorites,
    update_favorite,
};
use handlers::health::health_check;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Record store (PostgreSQL in production, in-memory in tests).
    pub repo: Arc<dyn FavoriteRepository>,
    /// Mutation notifications for the SSE feed.
    pub events: Arc<EventBus>,
}

impl AppState {
    pub fn new(repo: Arc<dyn FavoriteRepository>) -> Self {
        Self {
            repo,
            events: Arc::new(EventBus::default()),
        }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryFavoriteRepository::new()))
    }

    /// Share an existing event bus.
    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = events;
        self
    }
}

/// OpenAPI document served at `/api-docs/openapi.json` and rendered at `/docs`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Marquee API",
        description = "Personal list of favorite movies and TV shows"
    ),
    paths(
        handlers::health::health_check,
        handlers::favorites::list_favorites,
        handlers::favorites::get_favorite,
        handlers::favorites::create_favorite,
        handlers::favorites::update_favorite,
        handlers::favorites::delete_favorite,
        handlers::favorites::favorite_events,
    ),
    components(schemas(FavoriteEntry, NewFavorite, FavoritePage, MediaType, FieldError)),
    tags(
        (name = "Favorites", description = "Favorite CRUD and pagination"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Convert a handler panic into the generic 500 body.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(subsystem = logging::SUBSYSTEM_API, panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": SERVER_ERROR_MESSAGE })),
    )
        .into_response()
}

/// Routes only, without middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // OpenAPI / Swagger UI
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Favorites
        .route("/api/favorites", get(list_favorites).post(create_favorite))
        .route("/api/favorites/events", get(favorite_events))
        .route(
            "/api/favorites/:id",
            get(get_favorite)
                .put(update_favorite)
                .delete(delete_favorite),
        )
        .with_state(state)
}

/// Full application: routes plus request id, tracing, CORS, and body limit.
pub fn app(state: AppState, config: &ServerConfig) -> Router {
    router(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(config.body_limit))
}
