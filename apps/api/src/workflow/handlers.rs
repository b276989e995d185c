//! Axum route handlers for running and inspecting workflow threads.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::workflow::{
    format_checkpoint_summary, validate_state, Checkpoint, GraphKind, NodeId, RunOutcome,
    WorkflowError, WorkflowInput, WorkflowState,
};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ThreadSnapshot {
    pub checkpoint: Checkpoint,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub seq: i64,
    pub checkpoint_id: Uuid,
    pub graph: GraphKind,
    pub node: NodeId,
    pub next: Option<NodeId>,
    pub current_step: &'static str,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Checkpoint> for HistoryEntry {
    fn from(c: &Checkpoint) -> Self {
        Self {
            seq: c.seq,
            checkpoint_id: c.checkpoint_id,
            graph: c.graph,
            node: c.node,
            next: c.next,
            current_step: c.state.current_step.as_str(),
            error: c.state.error.clone(),
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub thread_id: String,
    pub removed: u64,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// Rejects inputs whose job query could never be searched.
fn check_input(input: &WorkflowInput) -> Result<(), AppError> {
    let preview = WorkflowState {
        job_query: input.job_query.clone(),
        ..WorkflowState::default()
    };
    let problems = validate_state(&preview);
    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(problems.join("; ")))
    }
}

/// POST /api/v1/workflows/:thread_id/invoke/:graph
///
/// Merges the body into the thread's latest state and runs the graph until
/// END or an interrupt.
pub async fn handle_invoke(
    State(state): State<AppState>,
    Path((thread_id, graph)): Path<(String, String)>,
    Json(input): Json<WorkflowInput>,
) -> Result<Json<RunOutcome>, AppError> {
    let kind: GraphKind = graph.parse()?;
    check_input(&input)?;

    let outcome = state.runner.invoke(kind, &thread_id, input).await?;
    Ok(Json(outcome))
}

/// GET /api/v1/workflows/:thread_id
pub async fn handle_get_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Result<Json<ThreadSnapshot>, AppError> {
    let checkpoint = state
        .runner
        .latest(&thread_id)
        .await?
        .ok_or(WorkflowError::ThreadNotFound(thread_id))?;

    let summary = format_checkpoint_summary(&checkpoint.state);
    Ok(Json(ThreadSnapshot {
        checkpoint,
        summary,
    }))
}

/// GET /api/v1/workflows/:thread_id/history
///
/// Oldest first. States are omitted; fetch the thread for the latest one.
pub async fn handle_history(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let checkpoints = state
        .runner
        .checkpointer()
        .list(&thread_id)
        .await
        .map_err(WorkflowError::Checkpoint)?;

    if checkpoints.is_empty() {
        return Err(WorkflowError::ThreadNotFound(thread_id).into());
    }

    Ok(Json(checkpoints.iter().map(HistoryEntry::from).collect()))
}

/// DELETE /api/v1/workflows/:thread_id
pub async fn handle_clear(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Result<Json<ClearResponse>, AppError> {
    let removed = state.runner.clear(&thread_id).await?;

    Ok(Json(ClearResponse { thread_id, removed }))
}
