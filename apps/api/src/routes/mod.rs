pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::allocation::handlers;
use crate::errors::AppError;
use crate::state::AppState;

async fn not_found() -> AppError {
    AppError::NotFound("No such route".to_string())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Planogram API
        .route(
            "/api/v1/planograms/validate",
            post(handlers::handle_validate),
        )
        .route(
            "/api/v1/planograms/validate/batch",
            post(handlers::handle_validate_batch),
        )
        .route(
            "/api/v1/planograms/optimize",
            post(handlers::handle_optimize),
        )
        // Shelf API
        .route(
            "/api/v1/shelves/utilization",
            post(handlers::handle_shelf_utilization),
        )
        .route(
            "/api/v1/shelves/placement/check",
            post(handlers::handle_can_add_slot),
        )
        .route(
            "/api/v1/shelves/placement/find-space",
            post(handlers::handle_find_space),
        )
        .route(
            "/api/v1/shelves/placement/auto-adjust",
            post(handlers::handle_auto_adjust),
        )
        .fallback(not_found)
        .with_state(state)
}
