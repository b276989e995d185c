use tracing::info;

use crate::llm_client::{prompts::fill, LlmClient, LlmError};
use crate::resume::models::{Resume, ResumeAnalysis};
use crate::resume::prompts::{RESUME_ANALYSIS_PROMPT, RESUME_ANALYSIS_SYSTEM};

/// Asks the LLM for a quality review of a parsed resume.
pub async fn analyze_resume_quality(
    resume: &Resume,
    llm: &LlmClient,
) -> Result<ResumeAnalysis, LlmError> {
    let resume_json = serde_json::to_string_pretty(resume)?;
    let prompt = fill(RESUME_ANALYSIS_PROMPT, &[("resume_json", resume_json.as_str())]);

    let analysis: ResumeAnalysis = llm.call_json(&prompt, RESUME_ANALYSIS_SYSTEM).await?;

    info!(
        "Resume analysis for '{}': {} strengths, {} weaknesses",
        resume.name,
        analysis.strengths.len(),
        analysis.weaknesses.len()
    );
    Ok(analysis)
}
