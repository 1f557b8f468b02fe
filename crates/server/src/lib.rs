//! Read-only JSON API over the analysis artifacts.

pub mod config;
pub mod error;
pub mod routes;

use axum::{routing::get, Extension, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;

/// Build the application router.
pub fn app(config: Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        // Specific mistake views before the plain listing
        .route("/api/mistakes/by-opening", get(routes::mistakes::get_mistakes_by_opening))
        .route("/api/mistakes/by-sequence", get(routes::mistakes::get_mistakes_by_sequence))
        .route("/api/mistakes", get(routes::mistakes::get_mistakes))
        .route("/api/statistics", get(routes::statistics::get_statistics))
        .fallback(routes::not_found)
        .layer(Extension(config))
        .layer(CompressionLayer::new())
        .layer(cors)
}
