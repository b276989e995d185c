//! Axum route handlers for the Resume API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::resume::{read_resume_upload, ResumeData};
use crate::state::AppState;
use crate::workflow::{workflow_thread_id, GraphKind, RunOutcome, WorkflowInput};

const DEFAULT_USER: &str = "default";

struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

/// POST /api/v1/resumes/parse
///
/// Multipart fields: `file` (required, .pdf/.docx/.doc/.txt), `user`
/// (optional) and `thread_id` (optional, defaults to `workflow_{user}_resume`).
/// Extracts the text and runs the resume graph on the thread.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RunOutcome>, AppError> {
    let mut upload: Option<Upload> = None;
    let mut user = DEFAULT_USER.to_string();
    let mut thread_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::Validation("file field needs a file name".to_string()))?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
                upload = Some(Upload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "user" | "thread_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid {name} field: {e}")))?;
                let value = value.trim().to_string();
                if value.is_empty() {
                    continue;
                }
                if name == "user" {
                    user = value;
                } else {
                    thread_id = Some(value);
                }
            }
            _ => {}
        }
    }

    let upload =
        upload.ok_or_else(|| AppError::Validation("Missing multipart field 'file'".to_string()))?;
    let file_name = upload.file_name.clone();
    let text = read_resume_upload(upload.file_name, upload.bytes).await?;
    info!(
        "Extracted {} characters from '{file_name}'",
        text.chars().count()
    );

    let thread_id = thread_id.unwrap_or_else(|| workflow_thread_id(GraphKind::Resume, &user));
    let input = WorkflowInput {
        resume: Some(ResumeData::from_text(text)),
        ..WorkflowInput::default()
    };
    let outcome = state
        .runner
        .invoke(GraphKind::Resume, &thread_id, input)
        .await?;

    Ok(Json(outcome))
}
