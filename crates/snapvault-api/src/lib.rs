//! snapvault-api - HTTP layer for the snapvault image ingestion service
//!
//! This crate provides the axum router and handlers on top of the
//! snapvault-core storage engine.
//!
//! # Usage
//!
//! ```ignore
//! use snapvault_api::{create_router, AppState};
//! use snapvault_core::ImageStore;
//!
//! let state = AppState::new(ImageStore::new("uploads"), "static");
//! let router = create_router(state);
//! ```

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Upper bound on upload bodies; base64 inflates the image by about 4/3
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Create the snapvault router with the given application state
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Landing page
        .route("/", get(handlers::pages::index))
        // Image ingestion
        .route(
            "/upload",
            post(handlers::upload::upload_image)
                .route_layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // Static assets
        .nest_service("/static", ServeDir::new(state.static_dir.clone()))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
