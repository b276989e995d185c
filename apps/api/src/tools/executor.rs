use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::interview::{self, QuestionCategory, DEFAULT_QUESTIONS};
use crate::job_search::{JobListing, JobQuery};
use crate::resume::{self, Resume};
use crate::state::Services;
use crate::tools::definitions::*;
use crate::tools::ToolError;

const DEFAULT_AUDIO_MIME: &str = "audio/wav";

#[derive(Deserialize)]
struct MatchParams {
    resume_data: Resume,
    job_data: JobListing,
}

#[derive(Deserialize)]
struct ResumeParams {
    resume_data: Resume,
}

#[derive(Deserialize)]
struct QuestionParams {
    job_data: JobListing,
    #[serde(default)]
    resume_data: Option<Resume>,
    #[serde(default = "default_question_count")]
    question_count: u32,
}

fn default_question_count() -> u32 {
    DEFAULT_QUESTIONS
}

#[derive(Deserialize)]
struct AudioParams {
    question_text: String,
}

#[derive(Deserialize)]
struct TranscribeParams {
    audio_bytes: String,
    #[serde(default)]
    mime_type: Option<String>,
}

#[derive(Deserialize)]
struct FeedbackParams {
    question: String,
    question_type: QuestionCategory,
    candidate_response: String,
}

fn parse<T: DeserializeOwned>(tool: &str, params: Value) -> Result<T, ToolError> {
    // models sometimes send `null` for a tool without arguments
    let params = if params.is_null() { json!({}) } else { params };
    serde_json::from_value(params).map_err(|e| ToolError::InvalidParams {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

/// Runs one registry tool against the live services and returns its JSON result.
pub async fn execute_tool(
    name: &str,
    params: Value,
    services: &Services,
) -> Result<Value, ToolError> {
    info!("Executing tool '{name}'");

    match name {
        SEARCH_JOBS => {
            let query: JobQuery = parse(name, params)?;
            let jobs = services.jobs.search(&query).await?;
            Ok(serde_json::to_value(jobs)?)
        }
        ANALYZE_JOB_MATCH => {
            let p: MatchParams = parse(name, params)?;
            let analysis = services
                .match_scorer
                .score(&p.resume_data, &p.job_data)
                .await?;
            Ok(serde_json::to_value(analysis)?)
        }
        ANALYZE_RESUME_QUALITY => {
            let p: ResumeParams = parse(name, params)?;
            let analysis = resume::analyze_resume_quality(&p.resume_data, &services.llm).await?;
            Ok(serde_json::to_value(analysis)?)
        }
        GENERATE_INTERVIEW_QUESTIONS => {
            let p: QuestionParams = parse(name, params)?;
            let questions = interview::generate_questions(
                &p.job_data,
                p.resume_data.as_ref(),
                p.question_count,
                &services.llm,
            )
            .await?;
            Ok(serde_json::to_value(questions)?)
        }
        GENERATE_QUESTION_AUDIO => {
            let p: AudioParams = parse(name, params)?;
            let audio = services.speech.synthesize(&p.question_text).await?;
            Ok(json!({
                "audio_base64": STANDARD.encode(&audio),
                "content_type": "audio/mpeg",
            }))
        }
        TRANSCRIBE_CANDIDATE_RESPONSE => {
            let p: TranscribeParams = parse(name, params)?;
            let audio = STANDARD.decode(p.audio_bytes.trim())?;
            let mime = p.mime_type.as_deref().unwrap_or(DEFAULT_AUDIO_MIME);
            let transcript = services.speech.transcribe(&audio, mime).await?;
            Ok(Value::String(transcript))
        }
        GENERATE_INTERVIEW_FEEDBACK => {
            let p: FeedbackParams = parse(name, params)?;
            let feedback = interview::generate_feedback(
                &p.question,
                p.question_type,
                &p.candidate_response,
                &services.llm,
            )
            .await?;
            Ok(serde_json::to_value(feedback)?)
        }
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}
