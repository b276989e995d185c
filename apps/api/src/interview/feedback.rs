use tracing::info;

use crate::interview::models::{InterviewFeedback, QuestionCategory};
use crate::interview::prompts::{FEEDBACK_PROMPT, FEEDBACK_SYSTEM};
use crate::llm_client::{prompts::fill, LlmClient, LlmError};

/// Scores and critiques a transcribed answer. Scores are clamped to 0..=10.
pub async fn generate_feedback(
    question: &str,
    category: QuestionCategory,
    answer: &str,
    llm: &LlmClient,
) -> Result<InterviewFeedback, LlmError> {
    let prompt = fill(
        FEEDBACK_PROMPT,
        &[
            ("question_type", category.as_str()),
            ("question", question),
            ("answer", answer),
        ],
    );

    let feedback = llm
        .call_json::<InterviewFeedback>(&prompt, FEEDBACK_SYSTEM)
        .await?
        .clamped();

    info!(
        "Feedback generated: confidence={} accuracy={}",
        feedback.confidence_score, feedback.accuracy_score
    );
    Ok(feedback)
}

/// Neutral feedback recorded when the feedback call fails, so the answer is still kept.
pub fn fallback_feedback(reason: &str) -> InterviewFeedback {
    InterviewFeedback {
        evaluation: format!("Unable to generate detailed feedback: {reason}"),
        strengths: vec!["Response was recorded".to_string()],
        weaknesses: vec!["Feedback generation encountered an error".to_string()],
        suggestions: vec!["Try answering again with more detail".to_string()],
        confidence_score: 5.0,
        accuracy_score: 5.0,
    }
}
