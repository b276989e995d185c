//! Axum route handlers for live interview threads.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::artifacts::report_key;
use crate::errors::AppError;
use crate::interview::{render_report, report_file_name, InterviewQuestion, InterviewSession};
use crate::job_search::JobListing;
use crate::resume::{Resume, ResumeData};
use crate::state::AppState;
use crate::workflow::{
    interview_thread_id, AudioClip, Checkpoint, GraphKind, NodeId, RunOutcome, UserPreferences,
    WorkflowError, WorkflowInput,
};

const DEFAULT_AUDIO_MIME: &str = "audio/wav";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub user: String,
    pub job: JobListing,
    #[serde(default)]
    pub resume: Option<Resume>,
    #[serde(default)]
    pub question_count: Option<u32>,
    #[serde(default)]
    pub interview_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub index: usize,
}

#[derive(Debug, Serialize)]
pub struct NavigateResponse {
    pub thread_id: String,
    pub current_question_index: usize,
    pub question: InterviewQuestion,
    pub tips: String,
    pub answered: bool,
    pub progress_percentage: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn latest_checkpoint(state: &AppState, thread_id: &str) -> Result<Checkpoint, AppError> {
    state
        .runner
        .latest(thread_id)
        .await?
        .ok_or_else(|| WorkflowError::ThreadNotFound(thread_id.to_string()).into())
}

fn session_of(checkpoint: &Checkpoint) -> Result<&InterviewSession, AppError> {
    checkpoint.state.interview_session.as_ref().ok_or_else(|| {
        AppError::Validation(format!(
            "Thread '{}' has no interview session",
            checkpoint.thread_id
        ))
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Starts (or restarts) the interview for a job on the thread
/// `interview_{user}_{job title}`, and pauses on the first question.
pub async fn handle_start(
    State(state): State<AppState>,
    Json(request): Json<StartInterviewRequest>,
) -> Result<Json<RunOutcome>, AppError> {
    if request.user.trim().is_empty() {
        return Err(AppError::Validation("user cannot be empty".to_string()));
    }
    if request.job.title.trim().is_empty() {
        return Err(AppError::Validation("job.title cannot be empty".to_string()));
    }

    let thread_id = interview_thread_id(&request.job.title, request.user.trim());
    let mut prefs = UserPreferences::default();
    if let Some(count) = request.question_count {
        prefs.question_count = count;
    }
    if let Some(kind) = request.interview_type.filter(|t| !t.trim().is_empty()) {
        prefs.interview_type = kind;
    }

    let input = WorkflowInput {
        resume: request.resume.map(|profile| ResumeData {
            profile: Some(profile),
            ..ResumeData::default()
        }),
        selected_job: Some(request.job),
        user_preferences: Some(prefs),
        ..WorkflowInput::default()
    };

    let outcome = state
        .runner
        .resume_at(GraphKind::Interview, &thread_id, NodeId::GenerateQuestions, input)
        .await?;
    Ok(Json(outcome))
}

/// POST /api/v1/interviews/:thread_id/answer
///
/// The raw request body is the candidate's recorded answer; its
/// `Content-Type` is forwarded to transcription (default audio/wav).
pub async fn handle_answer(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RunOutcome>, AppError> {
    if body.is_empty() {
        return Err(AppError::Validation("Audio body is empty".to_string()));
    }

    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_AUDIO_MIME.to_string());
    let size = body.len();

    let input = WorkflowInput {
        audio: Some(AudioClip {
            bytes: body.to_vec(),
            mime: mime.clone(),
        }),
        ..WorkflowInput::default()
    };
    let outcome = state
        .runner
        .resume_checked(&thread_id, NodeId::ConductQuestion, input, |checkpoint| {
            let session = checkpoint.state.interview_session.as_ref().ok_or_else(|| {
                WorkflowError::InvalidState(format!(
                    "Thread '{}' has no interview session",
                    checkpoint.thread_id
                ))
            })?;
            if !session.is_active {
                return Err(WorkflowError::InvalidState(
                    "The interview session is already complete".to_string(),
                ));
            }
            info!(
                "[{}] answer received for question {} ({size} bytes, {mime})",
                checkpoint.thread_id,
                session.current_question_index + 1,
            );
            Ok(())
        })
        .await?;

    Ok(Json(outcome))
}

/// GET /api/v1/interviews/:thread_id/question-audio
///
/// MP3 of the current question. Served from the artifact store when the
/// workflow already uploaded one, synthesized on demand otherwise.
pub async fn handle_question_audio(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Result<Response, AppError> {
    let checkpoint = latest_checkpoint(&state, &thread_id).await?;
    let session = session_of(&checkpoint)?;
    let question = session.current_question().ok_or_else(|| {
        AppError::Validation("No current question: the interview is finished".to_string())
    })?;

    let stored = match (&state.services.artifacts, &checkpoint.state.question_audio_key) {
        (Some(store), Some(key)) => match store.get(key).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Stored question audio unavailable, synthesizing: {e}");
                None
            }
        },
        _ => None,
    };

    let audio = match stored {
        Some(bytes) => bytes,
        None => state.services.speech.synthesize(&question.question).await?.to_vec(),
    };

    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response())
}

/// POST /api/v1/interviews/:thread_id/navigate
///
/// Jumps to a question without running the graph. The thread still resumes
/// at `conduct_question`.
pub async fn handle_navigate(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    Json(request): Json<NavigateRequest>,
) -> Result<Json<NavigateResponse>, AppError> {
    let checkpoint = state
        .runner
        .update_state(&thread_id, |s| {
            let session = s.interview_session.as_mut().ok_or_else(|| {
                WorkflowError::InvalidState("thread has no interview session".to_string())
            })?;
            session
                .navigate_to(request.index)
                .map_err(|e| WorkflowError::InvalidState(e.to_string()))?;
            s.question_audio_key = None;
            Ok(())
        })
        .await?;

    let session = session_of(&checkpoint)?;
    let question = session
        .current_question()
        .cloned()
        .ok_or_else(|| AppError::Workflow("navigation left no current question".to_string()))?;

    Ok(Json(NavigateResponse {
        thread_id,
        current_question_index: session.current_question_index,
        answered: session.response_for(session.current_question_index).is_some(),
        progress_percentage: session.progress_percentage(),
        tips: question.tips_text(),
        question,
    }))
}

/// GET /api/v1/interviews/:thread_id/report
///
/// Markdown report as an attachment. Also uploaded to the artifact store
/// when one is configured; the key is returned in `x-report-key`.
pub async fn handle_report(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Result<Response, AppError> {
    let checkpoint = latest_checkpoint(&state, &thread_id).await?;
    let session = session_of(&checkpoint)?;

    let report = render_report(session);
    let file_name = report_file_name(session, Utc::now());

    let mut uploaded_key = None;
    if let Some(store) = &state.services.artifacts {
        let key = report_key(&thread_id, &file_name);
        match store
            .put(&key, report.clone().into_bytes(), "text/markdown")
            .await
        {
            Ok(()) => uploaded_key = Some(key),
            Err(e) => warn!("Report upload failed: {e}"),
        }
    }

    let mut response = (
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        report,
    )
        .into_response();

    if let Some(key) = uploaded_key.and_then(|k| HeaderValue::from_str(&k).ok()) {
        response.headers_mut().insert("x-report-key", key);
    }

    Ok(response)
}
