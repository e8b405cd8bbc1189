//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: engine, record store and generator wiring
//! - `routes/`: HTTP handlers (forecasting, assistant, system)
//! - `dto.rs`: request/response DTOs not owned by the engine
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::map_response_body::MapResponseBodyLayer;
use tower_http::trace::TraceLayer;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: services::AppServices) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::router()
        .layer(Extension(Arc::new(services)))
        .layer(
            ServiceBuilder::new()
                .layer(cors)
                .layer(MapResponseBodyLayer::new(axum::body::Body::new))
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(middleware::request_context)),
        )
}
