//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: stores, buses, realtime gateway, views
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `errors.rs`: consistent error responses

use std::path::Path;
use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::realtime::socket;

pub mod errors;
pub mod routes;
pub mod services;

/// Build the full router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: Arc<services::AppServices>, static_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .route("/ws", get(socket::ws_handler))
        .nest("/api", routes::api_router())
        .merge(routes::page_router())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(services)),
        )
}
