//! Liveness endpoint.

use axum::{response::IntoResponse, Json};

/// Health check.
///
/// # Returns
/// - 200 OK with `{ "status": "healthy", "version": ... }`
#[utoipa::path(get, path = "/health", tag = "System",
    responses((status = 200, description = "Server is up"))
)]
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
