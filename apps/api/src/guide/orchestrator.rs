//! Generation orchestrator — owns the single in-memory session and drives the
//! two backend calls (initial generation, refinement).
//!
//! Phases: Idle → Generating → Ready ⇄ RefinementPending, and back to Idle on
//! "start new". The session lock is never held across a backend call; a
//! result that resolves after the session moved on is dropped (epoch check).
//! The document is replaced wholesale, never edited in place.

use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::errors::AppError;
use crate::guide::industry::Industry;
use crate::guide::merger::merge_refinement;
use crate::guide::model::{Document, GeneratedDocument, Section};
use crate::guide::prompts::{
    GUIDE_SYSTEM_TEMPLATE, GUIDE_USER_TEMPLATE, REFINEMENT_SYSTEM_TEMPLATE, REFINEMENT_USER_PROMPT,
};
use crate::guide::render::{render_document, render_section, ExportView, SectionView};
use crate::guide::sanitizer::{parse_payload, MalformedResponseError};
use crate::llm_client::prompts::{CONTENT_BLOCK_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::TextGenerator;

pub const JD_REQUIRED_MESSAGE: &str = "Please provide at least a Job Description.";
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate. Please try again.";
pub const REFINEMENT_FAILED_MESSAGE: &str = "Refinement failed. Try again.";

// ────────────────────────────────────────────────────────────────────────────
// Session state
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Generating,
    Ready,
    RefinementPending,
}

/// Free-text inputs typed by the user. Only `jd_text` is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideInputs {
    #[serde(default)]
    pub jd_text: String,
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub company_info: String,
    #[serde(default)]
    pub notes: String,
    /// Falls back to the configured default industry.
    #[serde(default)]
    pub industry: Option<Industry>,
}

#[derive(Debug, Default)]
struct Session {
    phase: Phase,
    inputs: GuideInputs,
    industry: Industry,
    document: Option<Arc<Document>>,
    active_section: Option<String>,
    last_error: Option<String>,
    notification: Option<String>,
    epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidebarEntry {
    pub id: String,
    pub title: String,
    pub is_refinement: bool,
    pub active: bool,
}

/// Read-only view of the session for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub generating: bool,
    pub refining: bool,
    pub inputs: GuideInputs,
    pub industry: Industry,
    pub role: Option<String>,
    pub generated_at: Option<String>,
    pub active_section: Option<String>,
    pub sidebar: Vec<SidebarEntry>,
    pub last_error: Option<String>,
    pub notification: Option<String>,
}

impl Session {
    fn snapshot(&self) -> SessionSnapshot {
        let sidebar = self
            .document
            .as_ref()
            .map(|doc| {
                doc.sections()
                    .iter()
                    .map(|s| SidebarEntry {
                        id: s.id.clone(),
                        title: s.title.clone(),
                        is_refinement: s.is_refinement,
                        active: self.active_section.as_deref() == Some(s.id.as_str()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        SessionSnapshot {
            phase: self.phase,
            generating: self.phase == Phase::Generating,
            refining: self.phase == Phase::RefinementPending,
            inputs: self.inputs.clone(),
            industry: self.industry,
            role: self.document.as_ref().map(|d| d.meta().role.clone()),
            generated_at: self.document.as_ref().map(|d| d.meta().generated_at.clone()),
            active_section: self.active_section.clone(),
            sidebar,
            last_error: self.last_error.clone(),
            notification: self.notification.clone(),
        }
    }

    fn require_document(&self) -> Result<&Arc<Document>, AppError> {
        self.document
            .as_ref()
            .ok_or_else(|| AppError::Conflict("No guide has been generated yet".to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

pub struct GenerationOrchestrator {
    generator: Arc<dyn TextGenerator>,
    default_industry: Industry,
    session: Mutex<Session>,
}

impl GenerationOrchestrator {
    pub fn new(generator: Arc<dyn TextGenerator>, default_industry: Industry) -> Self {
        Self {
            generator,
            default_industry,
            session: Mutex::new(Session {
                industry: default_industry,
                ..Session::default()
            }),
        }
    }

    /// Idle → Generating → Ready | Idle.
    ///
    /// Inputs are stored before validation so a failed submit never loses what
    /// the user typed.
    pub async fn generate(&self, inputs: GuideInputs) -> Result<Arc<Document>, AppError> {
        let industry = inputs.industry.unwrap_or(self.default_industry);

        let epoch = {
            let mut session = self.session.lock().await;
            if session.phase != Phase::Idle {
                return Err(AppError::Conflict(
                    "A guide is already in progress; start a new prep first".to_string(),
                ));
            }
            session.inputs = inputs.clone();
            session.industry = industry;

            if inputs.jd_text.trim().is_empty() {
                session.last_error = Some(JD_REQUIRED_MESSAGE.to_string());
                return Err(AppError::Validation(JD_REQUIRED_MESSAGE.to_string()));
            }

            session.phase = Phase::Generating;
            session.last_error = None;
            session.epoch
        };

        info!("Generating {industry} guide ({} chars of JD)", inputs.jd_text.len());
        let outcome = self.run_generation(&inputs, industry).await;

        let mut session = self.session.lock().await;
        if session.epoch != epoch || session.phase != Phase::Generating {
            warn!("Discarding generation result: session was reset while it was in flight");
            return Err(AppError::Conflict(
                "The session was reset before generation finished".to_string(),
            ));
        }

        match outcome {
            Ok(document) => {
                let document = Arc::new(document);
                info!(
                    "Guide ready: role={:?}, {} sections",
                    document.meta().role,
                    document.sections().len()
                );
                session.active_section = document.first_section_id().map(String::from);
                session.document = Some(document.clone());
                session.phase = Phase::Ready;
                Ok(document)
            }
            Err(e) => {
                error!("Guide generation failed: {e}");
                session.phase = Phase::Idle;
                session.last_error = Some(GENERATION_FAILED_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    /// Ready → RefinementPending → Ready. Only one refinement may be in flight.
    pub async fn refine(&self, query: &str) -> Result<Arc<Section>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Validation(
                "Refinement query cannot be empty".to_string(),
            ));
        }

        let (epoch, document, industry) = {
            let mut session = self.session.lock().await;
            match session.phase {
                Phase::Ready => {}
                Phase::RefinementPending => {
                    return Err(AppError::Conflict(
                        "A refinement is already in progress".to_string(),
                    ))
                }
                Phase::Idle | Phase::Generating => {
                    return Err(AppError::Conflict(
                        "Generate a guide before refining it".to_string(),
                    ))
                }
            }
            let document = session.require_document()?.clone();
            session.phase = Phase::RefinementPending;
            session.notification = None;
            (session.epoch, document, session.industry)
        };

        info!("Refining guide: {query:?}");
        let outcome = self.run_refinement(&document, industry, query).await;

        let mut session = self.session.lock().await;
        if session.epoch != epoch || session.phase != Phase::RefinementPending {
            warn!("Discarding refinement result: session was reset while it was in flight");
            return Err(AppError::Conflict(
                "The session was reset before the refinement finished".to_string(),
            ));
        }
        session.phase = Phase::Ready;

        let merged = outcome.and_then(|merged| {
            let added = merged.sections().last().cloned().ok_or_else(|| {
                AppError::Internal(anyhow!("merged document has no sections"))
            })?;
            Ok((Arc::new(merged), added))
        });

        match merged {
            Ok((merged, added)) => {
                info!("Refinement '{}' appended as {}", added.title, added.id);
                session.active_section = Some(added.id.clone());
                session.document = Some(merged);
                Ok(added)
            }
            Err(e) => {
                error!("Refinement failed: {e}");
                session.notification = Some(REFINEMENT_FAILED_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    /// Switches the active section. Allowed while a refinement is pending.
    pub async fn select_section(&self, id: &str) -> Result<SectionView, AppError> {
        let mut session = self.session.lock().await;
        let view = {
            let document = session.require_document()?;
            let section = document
                .section(id)
                .ok_or_else(|| AppError::NotFound(format!("Section '{id}' not found")))?;
            render_section(section)
        };
        session.active_section = Some(view.id.clone());
        Ok(view)
    }

    pub async fn active_view(&self) -> Result<SectionView, AppError> {
        let session = self.session.lock().await;
        let document = session.require_document()?;
        let section = session
            .active_section
            .as_deref()
            .and_then(|id| document.section(id))
            .ok_or_else(|| AppError::NotFound("No active section".to_string()))?;
        Ok(render_section(section))
    }

    pub async fn section_view(&self, id: &str) -> Result<SectionView, AppError> {
        let session = self.session.lock().await;
        let section = session
            .require_document()?
            .section(id)
            .ok_or_else(|| AppError::NotFound(format!("Section '{id}' not found")))?;
        Ok(render_section(section))
    }

    /// Full print projection of the current document. No backend call.
    pub async fn export(&self) -> Result<ExportView, AppError> {
        let session = self.session.lock().await;
        Ok(render_document(session.require_document()?))
    }

    /// Back to Idle from any phase, dropping the document, inputs and messages.
    pub async fn start_new(&self) -> SessionSnapshot {
        let mut session = self.session.lock().await;
        let epoch = session.epoch + 1;
        *session = Session {
            industry: self.default_industry,
            epoch,
            ..Session::default()
        };
        info!("Session reset (epoch {epoch})");
        session.snapshot()
    }

    pub async fn dismiss_notification(&self) -> SessionSnapshot {
        let mut session = self.session.lock().await;
        session.notification = None;
        session.snapshot()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn document(&self) -> Option<Arc<Document>> {
        self.session.lock().await.document.clone()
    }

    async fn run_generation(
        &self,
        inputs: &GuideInputs,
        industry: Industry,
    ) -> Result<Document, AppError> {
        let system = build_guide_system(industry)?;
        let prompt = build_guide_prompt(inputs);

        let raw = self.generator.generate(&system, &prompt).await?;
        let payload: GeneratedDocument =
            parse_payload(&raw).inspect_err(|e| log_malformed(&raw, e))?;

        Ok(Document::from_generated(payload, industry, Utc::now().date_naive())?)
    }

    async fn run_refinement(
        &self,
        document: &Document,
        industry: Industry,
        query: &str,
    ) -> Result<Document, AppError> {
        let system = build_refinement_system(document, industry, query);

        let raw = self.generator.generate(&system, REFINEMENT_USER_PROMPT).await?;
        let payload: Value = parse_payload(&raw).inspect_err(|e| log_malformed(&raw, e))?;

        Ok(merge_refinement(document, payload)?)
    }
}

fn log_malformed(raw: &str, err: &MalformedResponseError) {
    warn!("Backend response rejected ({} chars): {err}", raw.len());
    debug!("Rejected backend response body: {raw}");
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt building
// ────────────────────────────────────────────────────────────────────────────

fn build_guide_system(industry: Industry) -> Result<String, AppError> {
    let templates = industry.sections();

    let section_plan = templates
        .iter()
        .map(|t| {
            format!(
                "- id \"{}\", title \"{}\" (prefer type \"{}\"): {}",
                t.id, t.title, t.block_type, t.focus
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let schema_json = serde_json::to_string_pretty(&json!({
        "meta": {"role": "Extracted Role Title", "generatedAt": "Current Date"},
        "sections": templates
            .iter()
            .map(|t| json!({"id": t.id, "title": t.title, "content": [{"type": t.block_type}]}))
            .collect::<Vec<_>>(),
    }))
    .map_err(|e| AppError::Internal(anyhow!("Failed to serialize schema: {e}")))?;

    Ok(GUIDE_SYSTEM_TEMPLATE
        .replace("{industry_framing}", industry.framing())
        .replace("{json_only}", JSON_ONLY_SYSTEM)
        .replace("{content_instruction}", CONTENT_BLOCK_INSTRUCTION)
        .replace("{section_plan}", &section_plan)
        .replace("{schema_json}", &schema_json))
}

fn build_guide_prompt(inputs: &GuideInputs) -> String {
    GUIDE_USER_TEMPLATE
        .replace("{jd}", inputs.jd_text.trim())
        .replace("{resume}", inputs.resume_text.trim())
        .replace("{company}", inputs.company_info.trim())
        .replace("{notes}", inputs.notes.trim())
}

fn build_refinement_system(document: &Document, industry: Industry, query: &str) -> String {
    let existing_sections = document
        .sections()
        .iter()
        .map(|s| s.title.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    REFINEMENT_SYSTEM_TEMPLATE
        .replace("{industry_framing}", industry.framing())
        .replace("{role}", &document.meta().role)
        .replace("{existing_sections}", &existing_sections)
        .replace("{query}", &query.replace('"', "'"))
        .replace("{json_only}", JSON_ONLY_SYSTEM)
        .replace("{content_instruction}", CONTENT_BLOCK_INSTRUCTION)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
