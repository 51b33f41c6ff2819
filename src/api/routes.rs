//! HTTP route definitions.

use axum::extract::DefaultBodyLimit;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{
    about, create_event, health, index, list_events, metrics_text, show_event, AppState,
};

/// Create the front-end router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        // Pages
        .route("/", get(index))
        .route("/about", get(about))
        .route("/events", get(list_events).post(create_event))
        .route("/event/:id", get(show_event))
        // Operations
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
