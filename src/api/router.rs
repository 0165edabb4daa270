use super::{AppState, handlers};
use crate::ratelimit::{self, RateLimiter};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Largest accepted request body.
pub const BODY_LIMIT: usize = 100 * 1024;

/// Builds and returns the full Axum router with all routes and shared state.
pub fn build(state: AppState, limiter: Arc<RateLimiter>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/weather-safety-data", post(handlers::create_report))
        .route("/api/user-searches", get(handlers::list_reports))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(middleware::from_fn_with_state(
            limiter,
            ratelimit::limit_by_client,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
