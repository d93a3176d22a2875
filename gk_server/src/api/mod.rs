//! HTTP API for the session authority.
//!
//! Wire actions are POST-routed by an action-name path segment:
//!
//! - `POST /api/auth/sign-up` `{name?, email, password}` → `{user}` | `{error}`
//! - `POST /api/auth/sign-in` `{email, password}` → `{user}` | `{error}`
//! - `POST /api/auth/sign-out` `{}` → `{user}` | `{error}`
//! - `POST /api/auth/get-session` (also via GET) → `{session: {...} | null}`
//! - `GET  /health` → server health status
//!
//! Unknown action names are rejected without touching the authority, as are
//! bodies missing a required field. Authority failures and adapter failures
//! sit in separate status bands; `get-session` never returns an error status
//! so polling callers need no special-case handling.

pub mod auth;
pub mod cookies;
pub mod request_id;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use gatekeeper::auth::Authority;
use gatekeeper::db::StoreHealth;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request (cheap due to the Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    /// The credential and session authority
    pub authority: Arc<Authority>,
    /// Connectivity probe for the backing store
    pub store_health: Arc<dyn StoreHealth>,
    /// Whether issued cookies carry the `Secure` attribute. On in
    /// production; a plain-HTTP development setup may switch it off.
    pub secure_cookies: bool,
}

/// Create the API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/auth/{action}",
            post(auth::dispatch_post).get(auth::dispatch_get),
        )
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Probes store connectivity and answers `200 OK` when the store responds,
/// `503 Service Unavailable` otherwise.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = state.store_health.is_healthy().await;

    let status = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "status": if store_healthy { "healthy" } else { "unhealthy" },
            "store": store_healthy,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}
