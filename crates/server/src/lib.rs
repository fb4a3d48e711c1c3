//! HTTP API for Whale Watch.
//!
//! All routes live under `/api` and speak JSON. Errors are returned as
//! `{"error": "<message>"}` with a 4xx/5xx status.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

/// Build the application router with permissive CORS.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors)
        .with_state(state)
}
