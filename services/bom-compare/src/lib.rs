//! BOM comparison HTTP service
//!
//! Exposes document parsing and master-vs-targets comparison over HTTP.
//! The router is built here so the server binary and the tests share it.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use bomdiff_utils::{AppConfig, BomLoader};

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;

use handlers::health_check;
use middleware::request_id_middleware;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub loader: Arc<BomLoader>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let loader = BomLoader::new(config.aliases.clone());
        Self {
            config: Arc::new(config),
            loader: Arc::new(loader),
        }
    }
}

pub fn create_app(config: &AppConfig) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))

        // API routes
        .nest("/api/v1", routes::create_api_routes())

        // Middleware stack
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST])
                        .allow_headers([header::CONTENT_TYPE]),
                )
                .layer(DefaultBodyLimit::max(config.server.max_request_size))
                .layer(axum::middleware::from_fn(request_id_middleware)),
        )

        // Application state
        .with_state(AppState::new(config.clone()))
}
