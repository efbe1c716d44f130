//! Axum route handlers for the Guide API.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::guide::industry::{Industry, SectionTemplate};
use crate::guide::orchestrator::{GuideInputs, SessionSnapshot};
use crate::guide::render::{render_section, ExportView, SectionView};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct IndustryInfo {
    pub industry: Industry,
    pub sections: &'static [SectionTemplate],
}

#[derive(Debug, Serialize)]
pub struct IndustriesResponse {
    pub default: Industry,
    pub industries: Vec<IndustryInfo>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub session: SessionSnapshot,
    pub active: Option<SectionView>,
}

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct RefineResponse {
    pub section: SectionView,
    pub session: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct SelectSectionRequest {
    pub section_id: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/industries
pub async fn handle_list_industries(State(state): State<AppState>) -> Json<IndustriesResponse> {
    Json(IndustriesResponse {
        default: state.config.default_industry,
        industries: Industry::ALL
            .into_iter()
            .map(|industry| IndustryInfo {
                industry,
                sections: industry.sections(),
            })
            .collect(),
    })
}

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.orchestrator.snapshot().await)
}

/// POST /api/v1/session/reset
///
/// "Start new prep": drops the document and inputs. A generation or
/// refinement still in flight is ignored when it resolves.
pub async fn handle_reset(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.orchestrator.start_new().await)
}

/// POST /api/v1/session/notification/dismiss
pub async fn handle_dismiss_notification(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.orchestrator.dismiss_notification().await)
}

/// POST /api/v1/guide/generate
///
/// Runs the initial generation and returns the session with the first section
/// rendered. Rejected with 400 before any backend call when `jd_text` is blank.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(inputs): Json<GuideInputs>,
) -> Result<Json<GenerateResponse>, AppError> {
    let document = state.orchestrator.generate(inputs).await?;

    let active = document.sections().first().map(|s| render_section(s));
    let session = state.orchestrator.snapshot().await;

    Ok(Json(GenerateResponse { session, active }))
}

/// POST /api/v1/guide/refine
///
/// Appends one refinement section and makes it active. 409 while another
/// refinement is pending.
pub async fn handle_refine(
    State(state): State<AppState>,
    Json(request): Json<RefineRequest>,
) -> Result<Json<RefineResponse>, AppError> {
    let added = state.orchestrator.refine(&request.query).await?;

    Ok(Json(RefineResponse {
        section: render_section(&added),
        session: state.orchestrator.snapshot().await,
    }))
}

/// GET /api/v1/guide/active
pub async fn handle_get_active(State(state): State<AppState>) -> Result<Json<SectionView>, AppError> {
    Ok(Json(state.orchestrator.active_view().await?))
}

/// PUT /api/v1/guide/active
pub async fn handle_select_active(
    State(state): State<AppState>,
    Json(request): Json<SelectSectionRequest>,
) -> Result<Json<SectionView>, AppError> {
    Ok(Json(
        state.orchestrator.select_section(&request.section_id).await?,
    ))
}

/// GET /api/v1/guide/sections/:id
pub async fn handle_get_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SectionView>, AppError> {
    Ok(Json(state.orchestrator.section_view(&id).await?))
}

/// GET /api/v1/guide/export
///
/// Every section in document order, for print. No backend call.
pub async fn handle_export(State(state): State<AppState>) -> Result<Json<ExportView>, AppError> {
    Ok(Json(state.orchestrator.export().await?))
}

/// GET /api/v1/guide/export.txt
pub async fn handle_export_text(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let export = state.orchestrator.export().await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        export.to_text(),
    ))
}
