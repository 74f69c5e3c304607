//! Health check endpoint

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    /// Whether remote classification/NER models are configured
    remote_models: bool,
    /// Number of entries in the condition vocabulary
    vocabulary_size: usize,
}

/// GET /health - Report server health and enabled features
pub async fn check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        remote_models: state.remote_models,
        vocabulary_size: nlq_core::condition::vocabulary_len(),
    })
}
