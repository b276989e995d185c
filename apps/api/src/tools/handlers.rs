//! Axum route handlers for the agent and direct tool execution.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::state::AppState;
use crate::tools::{execute_tool, AgentKind, AgentOutcome, AutonomousAgent};

#[derive(Debug, Deserialize)]
pub struct AgentRequest {
    pub request: String,
    #[serde(default)]
    pub context: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ToolResponse {
    pub tool: String,
    pub success: bool,
    pub result: Value,
}

/// POST /api/v1/agent/:kind
///
/// The model picks one tool for the request. Tool failures come back as
/// `{"success": false, "error": ..}` with status 200.
pub async fn handle_agent(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(body): Json<AgentRequest>,
) -> Result<Json<AgentOutcome>, AppError> {
    let kind: AgentKind = kind.parse()?;
    if body.request.trim().is_empty() {
        return Err(AppError::Validation("request cannot be empty".to_string()));
    }

    let agent = AutonomousAgent::new(kind, state.services.clone());
    let outcome = agent
        .decide_and_execute(&body.request, body.context.as_ref())
        .await;

    Ok(Json(outcome))
}

/// POST /api/v1/tools/:name
///
/// Runs a registry tool with the JSON body as its parameters.
pub async fn handle_execute_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(params): Json<Value>,
) -> Result<Json<ToolResponse>, AppError> {
    let result = execute_tool(&name, params, &state.services).await?;
    Ok(Json(ToolResponse {
        tool: name,
        success: true,
        result,
    }))
}
