use axum::{extract::State, Json};
use serde::Serialize;

use crate::guide::industry::Industry;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub model: String,
    pub default_industry: Industry,
}

/// GET /health
/// Liveness plus the backend model the session generates with. Never calls it.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "prepguide-api",
        version: env!("CARGO_PKG_VERSION"),
        model: state.config.gemini_model.clone(),
        default_industry: state.config.default_industry,
    })
}
