pub mod health;
pub mod model;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::report::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Model pass-through
        .route("/models", get(model::handle_list_models))
        .route("/generate", post(model::handle_generate))
        // Report API
        .route("/api/v1/reports/prompt", post(handlers::handle_build_prompt))
        .route("/api/v1/reports/normalize", post(handlers::handle_normalize))
        .route(
            "/api/v1/reports/generate",
            post(handlers::handle_generate_report),
        )
        .route("/api/v1/catalog", get(handlers::handle_catalog))
        .fallback(not_found)
        .with_state(state)
}
