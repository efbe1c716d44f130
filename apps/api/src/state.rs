use std::sync::Arc;

use crate::config::Config;
use crate::guide::orchestrator::GenerationOrchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the single prep session and the text-generation backend.
    pub orchestrator: Arc<GenerationOrchestrator>,
    pub config: Config,
}
