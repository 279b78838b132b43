use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::server::{AppState, handlers};

/// Uploads to `/upscale` may be full-size renders.
const UPSCALE_BODY_LIMIT: usize = 32 * 1024 * 1024;

/// All routes, with permissive CORS.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(handlers::healthcheck))
        .route(
            "/upscale",
            post(handlers::upscale).layer(DefaultBodyLimit::max(UPSCALE_BODY_LIMIT)),
        )
        // --- Parts ---
        .route("/{season}/parts/{part}/{id}", get(handlers::part))
        .route("/{season}/parts/{part}/{id}/render", get(handlers::part_render))
        // --- Citizens ---
        .route("/{season}/{key}/teardown", get(handlers::teardown))
        .route("/{season}/{key}/{id}", get(handlers::render))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
