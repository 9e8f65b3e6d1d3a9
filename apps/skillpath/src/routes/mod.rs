pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/analysis", post(handlers::handle_analysis))
        .route(
            "/api/v1/schedule/adapt",
            post(handlers::handle_adapt_schedule),
        )
        .route("/api/v1/evaluation", post(handlers::handle_evaluate))
        .route(
            "/api/v1/resources/judge",
            post(handlers::handle_judge_resource),
        )
        .with_state(state)
}
