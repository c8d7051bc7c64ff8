//! PWW software catalog API: companies (`aziende`) and the software they
//! publish, served over JSON with JWT-protected ViewSets.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod database;
pub mod dtos;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// The complete application: `/api` routes plus the banner and health check.
pub fn build_app(state: AppState) -> Router {
    let api = routes::create_router(&state);

    Router::new()
        .route("/", get(|| async { "PWW API" }))
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(axum_middleware::from_fn(middleware::logging::log_requests))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
