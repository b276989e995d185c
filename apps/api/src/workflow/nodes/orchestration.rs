use tracing::{info, warn};

use crate::llm_client::{prompts::fill, LlmClient};
use crate::workflow::prompts::INTENT_CLASSIFICATION_PROMPT;
use crate::workflow::state::{Step, WorkflowState};

fn step_for_intent(intent: &str) -> Step {
    match intent {
        "job_search" => Step::JobSearch,
        "interview_prep" => Step::InterviewPrep,
        _ => Step::ResumeUpload,
    }
}

/// Maps the latest human message to a workflow step.
pub async fn intent_classifier(state: &mut WorkflowState, llm: &LlmClient) {
    if state.current_step == Step::ResumeUpload && !state.user_preferences.auto_job_search {
        return;
    }

    let Some(user_input) = state.last_human_message().map(str::to_string) else {
        state.current_step = Step::ResumeUpload;
        return;
    };

    let prompt = fill(INTENT_CLASSIFICATION_PROMPT, &[("user_input", user_input.as_str())]);
    match llm.classify(&prompt).await {
        Ok(intent) => {
            info!("Intent classified as '{intent}'");
            state.current_step = step_for_intent(&intent);
            state.say(format!("Intent classified as: {intent}"));
        }
        Err(e) => {
            warn!("Intent classification failed: {e}");
            state.fail(
                format!("Intent classification failed: {e}"),
                Step::ResumeUpload,
            );
        }
    }
}

pub fn error_handler(state: &mut WorkflowState) {
    if let Some(error) = state.error.take() {
        warn!("Workflow error handled: {error}");
        state.say(format!("Error occurred: {error}"));
    }
}

pub fn workflow_complete(state: &mut WorkflowState) {
    let mut parts = Vec::new();

    if state.has_resume_profile() {
        parts.push("Resume analyzed".to_string());
    }
    if !state.job_results.is_empty() {
        parts.push(format!("Found {} jobs", state.job_results.len()));
    }
    if state.selected_job.is_some() {
        parts.push("Job selected".to_string());
    }
    if let Some(analysis) = &state.match_analysis {
        parts.push(format!(
            "Match analysis complete ({}%)",
            analysis.match_score
        ));
    }
    if !state.interview_questions.is_empty() {
        parts.push(format!(
            "Generated {} interview questions",
            state.interview_questions.len()
        ));
    }
    if state
        .interview_session
        .as_ref()
        .is_some_and(|s| !s.is_active)
    {
        parts.push("Interview session completed".to_string());
    }

    let summary = if parts.is_empty() {
        "Workflow completed".to_string()
    } else {
        parts.join("\n")
    };

    state.say(format!(
        "**Workflow Complete!**\n\n{summary}\n\nWhat would you like to do next?"
    ));
    state.current_step = Step::Complete;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::neutral_match;
    use crate::test_utils::{sample_listing, MockProviders};
    use crate::workflow::state::Message;

    #[tokio::test]
    async fn test_resume_upload_short_circuits() {
        let mock = MockProviders::start().await;
        let mut state = WorkflowState {
            messages: vec![Message::human("find me jobs")],
            ..WorkflowState::default()
        };

        intent_classifier(&mut state, &mock.llm_client()).await;

        assert_eq!(state.current_step, Step::ResumeUpload);
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_classifies_last_human_message() {
        let mock = MockProviders::start().await;
        mock.push_chat_text("\"Job_Search\"\n");
        let mut state = WorkflowState {
            current_step: Step::Complete,
            messages: vec![
                Message::human("analyze my resume"),
                Message::human("now find rust jobs in Berlin"),
                Message::ai("Working on it"),
            ],
            ..WorkflowState::default()
        };

        intent_classifier(&mut state, &mock.llm_client()).await;

        assert_eq!(state.current_step, Step::JobSearch);
        assert_eq!(
            state.messages.last().unwrap().content,
            "Intent classified as: job_search"
        );
        let prompt = mock.requests_to("/chat/completions")[0].json()["messages"][0]["content"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(prompt.contains("User input: \"now find rust jobs in Berlin\""));
    }

    #[tokio::test]
    async fn test_unknown_intent_falls_back_to_resume_upload() {
        let mock = MockProviders::start().await;
        mock.push_chat_text("weather_report");
        let mut state = WorkflowState {
            current_step: Step::JobSearch,
            messages: vec![Message::human("is it raining?")],
            ..WorkflowState::default()
        };

        intent_classifier(&mut state, &mock.llm_client()).await;
        assert_eq!(state.current_step, Step::ResumeUpload);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_error_handler_reports_and_clears() {
        let mut state = WorkflowState {
            error: Some("Job search failed: timeout".to_string()),
            ..WorkflowState::default()
        };
        error_handler(&mut state);
        assert!(state.error.is_none());
        assert_eq!(
            state.messages[0].content,
            "Error occurred: Job search failed: timeout"
        );

        // nothing to report
        error_handler(&mut state);
        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn test_workflow_complete_summary() {
        let mut state = WorkflowState {
            job_results: vec![sample_listing(), sample_listing(), sample_listing()],
            selected_job: Some(sample_listing()),
            match_analysis: Some(neutral_match("n/a")),
            ..WorkflowState::default()
        };

        workflow_complete(&mut state);

        assert_eq!(state.current_step, Step::Complete);
        assert_eq!(
            state.messages[0].content,
            "**Workflow Complete!**\n\n\
             Found 3 jobs\n\
             Job selected\n\
             Match analysis complete (50%)\n\n\
             What would you like to do next?"
        );
    }

    #[test]
    fn test_workflow_complete_without_progress() {
        let mut state = WorkflowState::default();
        workflow_complete(&mut state);
        assert!(state.messages[0].content.contains("Workflow completed"));
    }
}
