//! Axum route handlers for the Analysis API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::evaluation::{evaluate_gaps, evaluate_resources, GapEvaluation, ResourceEvaluation};
use crate::analysis::orchestrator::PipelineReport;
use crate::analysis::resources::judge_resource_quality;
use crate::analysis::schedule::{adapt_schedule, Adaptation};
use crate::errors::AppError;
use crate::models::learning::{LearningResource, LearningSession, SkillGap};
use crate::models::profile::{JobPosting, UserProfile};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AdaptScheduleRequest {
    pub sessions: Vec<LearningSession>,
    pub completion_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct AdaptScheduleResponse {
    pub adaptation: Adaptation,
    pub sessions: Vec<LearningSession>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub gaps: Vec<SkillGap>,
    #[serde(default)]
    pub resources: Vec<LearningResource>,
    pub postings: Vec<JobPosting>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub gap_evaluation: GapEvaluation,
    pub resource_evaluation: ResourceEvaluation,
    pub evaluation_summary: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct JudgeResponse {
    pub quality_score: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analysis
///
/// Runs the full pipeline for a profile. Never fails on collaborator errors;
/// affected stages are reported in `fallback_stages`.
pub async fn handle_analysis(
    State(state): State<AppState>,
    Json(profile): Json<UserProfile>,
) -> Result<Json<PipelineReport>, AppError> {
    if profile.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if profile.target_role.trim().is_empty() {
        return Err(AppError::Validation("target_role cannot be empty".to_string()));
    }

    Ok(Json(state.pipeline.run(profile).await))
}

/// POST /api/v1/schedule/adapt
pub async fn handle_adapt_schedule(
    Json(mut request): Json<AdaptScheduleRequest>,
) -> Result<Json<AdaptScheduleResponse>, AppError> {
    if !(0.0..=1.0).contains(&request.completion_rate) {
        return Err(AppError::Validation(format!(
            "completion_rate must be within [0, 1], got {}",
            request.completion_rate
        )));
    }

    let adaptation = adapt_schedule(&mut request.sessions, request.completion_rate);

    Ok(Json(AdaptScheduleResponse {
        adaptation,
        sessions: request.sessions,
    }))
}

/// POST /api/v1/evaluation
///
/// Scores caller-supplied gaps and resources without running the pipeline.
pub async fn handle_evaluate(Json(request): Json<EvaluateRequest>) -> Json<EvaluateResponse> {
    let gap_evaluation = evaluate_gaps(&request.gaps, &request.postings);
    let resource_evaluation = evaluate_resources(&request.resources, &request.gaps);
    let evaluation_summary = gap_evaluation.summary();

    Json(EvaluateResponse {
        gap_evaluation,
        resource_evaluation,
        evaluation_summary,
    })
}

/// POST /api/v1/resources/judge
pub async fn handle_judge_resource(
    State(state): State<AppState>,
    Json(resource): Json<LearningResource>,
) -> Result<Json<JudgeResponse>, AppError> {
    let generator = state.pipeline.generator().ok_or(AppError::LlmUnavailable)?;
    let quality_score = judge_resource_quality(generator, &resource).await?;

    Ok(Json(JudgeResponse { quality_score }))
}
