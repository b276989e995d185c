use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::interview::InterviewError;
use crate::job_search::JobSearchError;
use crate::llm_client::LlmError;
use crate::resume::ExtractError;
use crate::speech::SpeechError;
use crate::tools::ToolError;
use crate::workflow::WorkflowError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Workflow error: {0}")]
    Workflow(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                msg.clone(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "An external service error occurred".to_string(),
                )
            }
            AppError::Workflow(msg) => {
                tracing::error!("Workflow error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "WORKFLOW_ERROR",
                    msg.clone(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Domain error conversions
// ────────────────────────────────────────────────────────────────────────────

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Llm(e.to_string())
    }
}

impl From<JobSearchError> for AppError {
    fn from(e: JobSearchError) -> Self {
        match e {
            JobSearchError::InvalidQuery(msg) => AppError::Validation(msg),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl From<SpeechError> for AppError {
    fn from(e: SpeechError) -> Self {
        match e {
            SpeechError::EmptyAudio | SpeechError::EmptyText => AppError::Validation(e.to_string()),
            SpeechError::EmptyTranscript => AppError::UnprocessableEntity(e.to_string()),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::UnsupportedFormat(_) => AppError::Validation(e.to_string()),
            other => AppError::UnprocessableEntity(other.to_string()),
        }
    }
}

impl From<InterviewError> for AppError {
    fn from(e: InterviewError) -> Self {
        match e {
            InterviewError::Llm(inner) => inner.into(),
            InterviewError::EmptyQuestions => AppError::Llm(e.to_string()),
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::ThreadNotFound(_) => AppError::NotFound(e.to_string()),
            WorkflowError::UnknownGraph(_) | WorkflowError::InvalidState(_) => {
                AppError::Validation(e.to_string())
            }
            WorkflowError::Checkpoint(inner) => AppError::Internal(inner),
            other => AppError::Workflow(other.to_string()),
        }
    }
}

impl From<ToolError> for AppError {
    fn from(e: ToolError) -> Self {
        match e {
            ToolError::UnknownTool(_) | ToolError::UnknownAgent(_) => {
                AppError::NotFound(e.to_string())
            }
            ToolError::InvalidParams { .. } | ToolError::Base64(_) => {
                AppError::Validation(e.to_string())
            }
            ToolError::Llm(inner) => inner.into(),
            ToolError::Search(inner) => inner.into(),
            ToolError::Speech(inner) => inner.into(),
            ToolError::Interview(inner) => inner.into(),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let (status, body) = render(AppError::NotFound("thread 'x'".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "thread 'x'");
    }

    #[tokio::test]
    async fn test_upstream_details_are_not_leaked() {
        let err: AppError = LlmError::Api {
            status: 500,
            message: "secret upstream detail".to_string(),
        }
        .into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "LLM_ERROR");
        assert!(!body.to_string().contains("secret upstream detail"));
    }

    #[test]
    fn test_domain_conversions() {
        assert!(matches!(
            AppError::from(ExtractError::UnsupportedFormat("rtf".into())),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(SpeechError::EmptyTranscript),
            AppError::UnprocessableEntity(_)
        ));
        assert!(matches!(
            AppError::from(ToolError::UnknownTool("fly".into())),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(WorkflowError::ThreadNotFound("t".into())),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(InterviewError::IndexOutOfRange { index: 9, len: 2 }),
            AppError::Validation(_)
        ));
    }
}
