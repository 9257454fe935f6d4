//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints for the admin panel:
//! - Post endpoints (CRUD plus the moderation queue)
//! - Category and tag endpoints
//! - Subscriber signup
//! - Auth endpoints
//! - Uploaded cover image serving

use axum::{extract::DefaultBodyLimit, middleware as axum_middleware, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::UploadConfig;

pub mod auth;
pub mod categories;
pub mod middleware;
pub mod posts;
pub mod subscribers;
pub mod tags;

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Moderation routes (need admin role)
    let admin_routes = Router::new()
        .nest("/admin/posts", posts::admin_router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but not admin)
    let protected_routes = Router::new()
        .nest("/posts", posts::router())
        .nest("/categories", categories::router())
        .nest("/tags", tags::router())
        .nest("/auth", auth::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .nest("/auth", auth::public_router())
        .nest("/subscribers", subscribers::router())
        .merge(admin_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, upload: &UploadConfig) -> Router {
    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        // Stored cover images
        .nest_service("/uploads/post", ServeDir::new(&upload.path))
        // Raise axum's default body limit so covers up to the configured
        // size make it through the multipart reader
        .layer(DefaultBodyLimit::max(upload.max_file_size as usize))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
