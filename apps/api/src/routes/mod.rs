pub mod health;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::interview::handlers as interview;
use crate::job_search::handlers as jobs;
use crate::resume::handlers as resume;
use crate::state::AppState;
use crate::tools::handlers as tools;
use crate::workflow::handlers as workflow;

/// Resume uploads and recorded answers.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resumes
        .route("/api/v1/resumes/parse", post(resume::handle_parse_resume))
        // Jobs
        .route("/api/v1/jobs/search", post(jobs::handle_search))
        .route(
            "/api/v1/jobs/saved",
            get(jobs::handle_list_saved)
                .post(jobs::handle_save)
                .delete(jobs::handle_remove_saved),
        )
        // Workflow threads
        .route(
            "/api/v1/workflows/:thread_id",
            get(workflow::handle_get_thread).delete(workflow::handle_clear),
        )
        .route(
            "/api/v1/workflows/:thread_id/history",
            get(workflow::handle_history),
        )
        .route(
            "/api/v1/workflows/:thread_id/invoke/:graph",
            post(workflow::handle_invoke),
        )
        // Interviews
        .route("/api/v1/interviews", post(interview::handle_start))
        .route(
            "/api/v1/interviews/:thread_id/answer",
            post(interview::handle_answer),
        )
        .route(
            "/api/v1/interviews/:thread_id/question-audio",
            get(interview::handle_question_audio),
        )
        .route(
            "/api/v1/interviews/:thread_id/navigate",
            post(interview::handle_navigate),
        )
        .route(
            "/api/v1/interviews/:thread_id/report",
            get(interview::handle_report),
        )
        // Agent and tools
        .route("/api/v1/agent/:kind", post(tools::handle_agent))
        .route("/api/v1/tools/:name", post(tools::handle_execute_tool))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Restricts CORS to the configured origins, or allows any origin when none are set.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{origin}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}
