use tracing::{info, warn};

use crate::llm_client::LlmClient;
use crate::resume::{analyze_resume_quality, extract_resume, missing_required_fields, ResumeAnalysis};
use crate::workflow::state::{Step, WorkflowState};

pub async fn parse_resume(state: &mut WorkflowState, llm: &LlmClient) {
    let raw_text = state
        .resume
        .as_ref()
        .map(|r| r.raw_text.trim().to_string())
        .unwrap_or_default();

    if raw_text.is_empty() {
        state.fail("No resume text provided for parsing", Step::ResumeUpload);
        return;
    }

    let profile = extract_resume(&raw_text, llm).await;
    if profile.is_placeholder() {
        warn!("Resume extraction failed; continuing with the placeholder profile");
    }
    info!("Parsed resume for '{}' ({} skills)", profile.name, profile.skills.len());

    let resume = state.resume.get_or_insert_with(Default::default);
    resume.profile = Some(profile);
    resume.analysis = None;
    state.current_step = Step::ResumeAnalysis;
}

/// Quality analysis never blocks the flow: a failed call stores a stand-in analysis.
pub async fn analyze_resume(state: &mut WorkflowState, llm: &LlmClient) {
    let Some(profile) = state.resume.as_ref().and_then(|r| r.profile.clone()) else {
        state.fail("Resume data not available for analysis", Step::ResumeUpload);
        return;
    };

    let analysis = match analyze_resume_quality(&profile, llm).await {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!("Resume analysis failed, using stand-in: {e}");
            ResumeAnalysis::unavailable(&e.to_string())
        }
    };

    if let Some(resume) = state.resume.as_mut() {
        resume.analysis = Some(analysis);
    }
    state.current_step = Step::ResumeAnalysis;
}

pub fn validate_resume(state: &mut WorkflowState) {
    let missing = match state.resume.as_ref().and_then(|r| r.profile.as_ref()) {
        Some(profile) => missing_required_fields(profile),
        None => vec![
            "name".to_string(),
            "email".to_string(),
            "skills (at least 1 skill required)".to_string(),
        ],
    };

    if !missing.is_empty() {
        state.fail(
            format!("Resume validation failed. Missing: {}", missing.join(", ")),
            Step::ResumeUpload,
        );
        return;
    }

    state.current_step = Step::JobSearch;
}
