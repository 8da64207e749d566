//! HTTP API for owner-scoped tasks.
//!
//! Every task route carries the owner's principal id as its first path
//! segment; the service rejects blank owners before touching storage.

pub mod dto;
mod error;
mod handlers;

use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub use error::ApiErrorResponse;
pub use handlers::{
    AppState, create_task, debug_schema, delete_task, get_task, health_check, index, list_tasks,
    toggle_task, update_task,
};

/// Builds the application router with request tracing and CORS.
#[must_use]
pub fn router(state: AppState, cors_origins: Vec<HeaderValue>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/debug/schema", get(debug_schema))
        .route("/items/user/{owner}", get(list_tasks).post(create_task))
        .route(
            "/items/user/{owner}/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/items/user/{owner}/{id}/toggle", post(toggle_task))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// CORS policy for the browser client.
#[must_use]
pub fn cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
}
