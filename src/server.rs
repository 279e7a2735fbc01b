//! HTTP server and routes.

pub(crate) mod handlers;
mod state;

pub use state::AppState;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let reader_routes = Router::new()
        .route("/{slug}", get(handlers::read_first_chapter))
        .route("/{slug}/{index}", get(handlers::read_chapter))
        .route("/{slug}/images/{image_name}", get(handlers::serve_image));

    let api_routes = Router::new()
        .route("/library", get(handlers::api_library))
        .route("/cache/clear", post(handlers::api_clear_cache));

    Router::new()
        .route("/", get(handlers::library_view))
        .nest("/read", reader_routes)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
