use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;

/// Rejects the request unless `X-API-Key` matches the configured key.
pub fn require_api_key(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        Some(key) if key == expected => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

#[derive(Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub response: String,
}

#[derive(Serialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

/// POST /generate
/// Raw prompt pass-through to the configured model.
pub async fn handle_generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    require_api_key(&headers, &state.config.api_key)?;

    if req.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt must not be empty".to_string()));
    }

    info!(
        "Forwarding prompt to {} ({} chars)",
        state.model.model_name(),
        req.prompt.len()
    );
    let response = state.model.generate(&req.prompt).await?;
    Ok(Json(GenerateResponse { response }))
}

/// GET /models
pub async fn handle_list_models(
    State(state): State<AppState>,
) -> Result<Json<ModelsResponse>, AppError> {
    let models = state.model.list_models().await?;
    Ok(Json(ModelsResponse { models }))
}
