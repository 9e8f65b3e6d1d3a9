use std::sync::Arc;

use crate::analysis::orchestrator::PipelineOrchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Live or fallback-only, decided once at startup.
    pub pipeline: Arc<PipelineOrchestrator>,
}
