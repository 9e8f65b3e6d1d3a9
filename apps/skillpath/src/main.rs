mod analysis;
mod config;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::orchestrator::PipelineOrchestrator;
use crate::config::Config;
use crate::llm_client::{build_generator, LlmError};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (malformed numeric settings abort startup)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SkillPath API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client; absence is reported once and the pipeline runs on fallback data
    let settings = config.pipeline.clone();
    let pipeline = match build_generator(config.llm.as_ref()) {
        Ok(generator) => {
            info!("LLM collaborator: {:?}", generator.provider());
            PipelineOrchestrator::new(Some(generator), settings)
        }
        Err(LlmError::NotConfigured) => {
            warn!("No LLM API key found; running in fallback mode with deterministic data");
            PipelineOrchestrator::fallback_only(settings)
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        "Pipeline ready (mode: {}, settings: {:?})",
        pipeline.mode(),
        pipeline.settings()
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict allowed origins once the dashboard host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
