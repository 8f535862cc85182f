//! HTTP/JSON surface for the Libris circulation service.
//!
//! # Responsibility
//! - Map REST routes onto `libris_core` services.
//! - Run blocking store work off the async executor.
//! - Translate service errors into status codes and `{"error": ...}` bodies.

pub mod config;
pub mod error;
pub mod server;
pub mod state;

mod dto;
mod request_log;
mod routes;

use axum::Router;
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub use config::ServerConfig;
pub use state::AppState;

/// Builds the application router. Non-API paths are served from
/// `static_dir` when one is given.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let router = routes::api_routes();
    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(axum::middleware::from_fn(request_log::log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
