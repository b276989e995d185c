//! LLM-based structured extraction of a `Resume` from raw text.

use tracing::{info, warn};

use crate::llm_client::{prompts::fill, CallOptions, LlmClient};
use crate::resume::models::Resume;
use crate::resume::prompts::{
    RESUME_EXTRACTION_PROMPT, RESUME_EXTRACTION_RETRY_SUFFIX, RESUME_EXTRACTION_SYSTEM,
};

const EXTRACTION_TEMPERATURE: f32 = 0.3;

/// Extracts a structured profile from resume text.
///
/// A response that fails `Resume::validate` is retried once with the violations
/// appended to the prompt. Any remaining failure yields `Resume::placeholder()`.
pub async fn extract_resume(resume_text: &str, llm: &LlmClient) -> Resume {
    let base_prompt = fill(RESUME_EXTRACTION_PROMPT, &[("resume_text", resume_text)]);
    let options = CallOptions::temperature(EXTRACTION_TEMPERATURE);

    let first = match llm
        .call_json_with::<Resume>(&base_prompt, RESUME_EXTRACTION_SYSTEM, options)
        .await
    {
        Ok(resume) => resume,
        Err(e) => {
            warn!("Resume extraction failed: {e}");
            return Resume::placeholder();
        }
    };

    let violations = first.validate();
    if violations.is_empty() {
        info!("Extracted resume for '{}' ({} skills)", first.name, first.skills.len());
        return first;
    }

    warn!(
        "Extracted resume failed validation ({} issues), retrying once",
        violations.len()
    );
    let retry_prompt = format!(
        "{base_prompt}{}",
        fill(
            RESUME_EXTRACTION_RETRY_SUFFIX,
            &[("violations", bullet_list(&violations).as_str())]
        )
    );

    match llm
        .call_json_with::<Resume>(&retry_prompt, RESUME_EXTRACTION_SYSTEM, options)
        .await
    {
        Ok(resume) if resume.validate().is_empty() => resume,
        Ok(resume) => {
            warn!("Resume still invalid after retry: {:?}", resume.validate());
            Resume::placeholder()
        }
        Err(e) => {
            warn!("Resume extraction retry failed: {e}");
            Resume::placeholder()
        }
    }
}

/// Required fields that are absent, in the wording shown to users.
pub fn missing_required_fields(resume: &Resume) -> Vec<String> {
    let mut missing = Vec::new();
    if resume.name.trim().is_empty() {
        missing.push("name".to_string());
    }
    if resume.email.trim().is_empty() {
        missing.push("email".to_string());
    }
    if resume.skills.is_empty() {
        missing.push("skills (at least 1 skill required)".to_string());
    }
    missing
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("- {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}
