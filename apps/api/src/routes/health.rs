use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and active backends.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "jobmittr-api",
        "environment": state.config.environment.as_str(),
        "checkpointer": state.runner.checkpointer().backend(),
        "match_scorer": state.services.match_scorer.backend(),
        "artifacts": state.services.artifacts.is_some(),
    }))
}
