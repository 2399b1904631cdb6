//! HTTP surface of the roster service.

pub mod handler;
pub mod trace;

use std::sync::Arc;

use axum::{Router, middleware, routing::get, routing::post};
use roster_core::dispatch::WorkerPool;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use super::config::ServerConfig;
use super::store::repository::StudentRepository;

/// Shared state injected into every handler.
///
/// The worker pool is the single process-wide dispatch resource: it is
/// constructed once in `main` and torn down once after the listener drains,
/// never per handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<WorkerPool>,
    pub repo: Arc<StudentRepository>,
    pub config: ServerConfig,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/students",
            post(handler::create_student).get(handler::list_students),
        )
        .route(
            "/api/students/{id}",
            get(handler::get_student)
                .put(handler::update_student)
                .delete(handler::delete_student),
        )
        .route("/health", get(handler::health))
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(middleware::from_fn(trace::trace_request)),
        )
        .with_state(state)
}
